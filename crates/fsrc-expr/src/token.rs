//! Token classification.
//!
//! Classification is an explicit, ordered decision made once per token:
//! numeric literal first (integer when the literal round-trips through the
//! integer domain), then positional reference, brace placeholder, operator,
//! and function patterns. Anything left is a bare [`Token::Word`]; whether
//! that is an error depends on the evaluator.

use std::sync::LazyLock;

use regex::Regex;

static VAR_PAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^x(\d+)$").unwrap());
static SUBS_PAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\{[a-zA-Z_]*\}$").unwrap());
static FUNC1_PAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z_]+[:a-zA-Z0-9_.]*)\(\)$").unwrap());
static FUNC2_PAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z_]+[:a-zA-Z0-9_.]*)\(,\)$").unwrap());

const BINARY_OPS: [&str; 10] = ["*", "+", "-", "/", "^", "|", "%", "&", "or", "and"];
const UNARY_OPS: [&str; 2] = ["!", "not"];

/// One classified token of a postfix program.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal that round-trips through the integer domain.
    Int(i64),
    /// Any other numeric literal.
    Float(f64),
    /// 1-based positional input reference `x<N>`.
    Positional(usize),
    /// Brace placeholder `{name}`, substituted by the caller before
    /// scalar evaluation and passed through textually otherwise.
    Placeholder(String),
    Binary(&'static str),
    Unary(&'static str),
    /// One-argument function `name()`.
    Func1(String),
    /// Two-argument function `name(,)`.
    Func2(String),
    /// Unrecognized bare word.
    Word(String),
}

/// Classifies a single raw token.
pub fn classify(raw: &str) -> Token {
    if let Ok(i) = raw.parse::<i64>() {
        return Token::Int(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Token::Float(f);
    }
    if let Some(caps) = VAR_PAT.captures(raw) {
        // The index always parses: the pattern only admits digits.
        if let Ok(index) = caps[1].parse::<usize>() {
            return Token::Positional(index);
        }
    }
    if SUBS_PAT.is_match(raw) {
        return Token::Placeholder(raw.to_string());
    }
    if let Some(op) = BINARY_OPS.iter().find(|op| **op == raw) {
        return Token::Binary(op);
    }
    if let Some(op) = UNARY_OPS.iter().find(|op| **op == raw) {
        return Token::Unary(op);
    }
    if let Some(caps) = FUNC1_PAT.captures(raw) {
        return Token::Func1(caps[1].to_string());
    }
    if let Some(caps) = FUNC2_PAT.captures(raw) {
        return Token::Func2(caps[1].to_string());
    }
    Token::Word(raw.to_string())
}

/// Quotes qualified function names (containing `:`) for SQL output.
pub fn sql_function_name(name: &str) -> String {
    if name.contains(':') {
        format!("\"{name}\"")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_literals_prefer_integers() {
        assert_eq!(classify("8"), Token::Int(8));
        assert_eq!(classify("-3"), Token::Int(-3));
        assert_eq!(classify("2.5"), Token::Float(2.5));
    }

    #[test]
    fn references_placeholders_and_operators() {
        assert_eq!(classify("x2"), Token::Positional(2));
        assert_eq!(classify("{visit}"), Token::Placeholder("{visit}".into()));
        assert_eq!(classify("or"), Token::Binary("or"));
        assert_eq!(classify("not"), Token::Unary("not"));
    }

    #[test]
    fn function_patterns() {
        assert_eq!(classify("sqrt()"), Token::Func1("sqrt".into()));
        assert_eq!(classify("zerofill(,)"), Token::Func2("zerofill".into()));
        assert_eq!(
            classify("pg_catalog:power(,)"),
            Token::Func2("pg_catalog:power".into())
        );
        assert_eq!(classify("nonsense"), Token::Word("nonsense".into()));
    }

    #[test]
    fn qualified_names_are_quoted() {
        assert_eq!(sql_function_name("power"), "power");
        assert_eq!(sql_function_name("a:b"), "\"a:b\"");
    }
}
