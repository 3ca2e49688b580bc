//! Immediate scalar evaluation.
//!
//! This evaluator produces one concrete value from a token program whose
//! brace placeholders have already been substituted with run-time context
//! (visit, raft, sensor). Its vocabulary is deliberately small: numeric
//! literals, positional references, the two identifier-building functions
//! `zerofill(value, width)` and `prepend(prefix, value)`, and bare words,
//! which push themselves as string values. It shares no code with the
//! textual evaluator in [`crate::sql`]; the two differ in operand handling
//! and function sets, and that asymmetry is intended behavior.

use std::fmt;

use crate::error::{ExprError, Result};
use crate::token::{Token, classify};

/// A concrete value produced by the scalar evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// The value as a decimal string (how it is stored in a column).
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// The value as an integer, for programs that compute numeric keys.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Str(s) => s.parse().ok(),
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Evaluates a postfix program to a single [`Value`].
///
/// Exactly one value must remain after the last token; anything else is a
/// malformed program.
pub fn rpn_eval(inputs: &[String], rpn: &[String]) -> Result<Value> {
    let program = rpn.to_vec();
    let mut stack: Vec<Value> = Vec::new();

    for raw in rpn {
        match classify(raw) {
            Token::Int(i) => stack.push(Value::Int(i)),
            Token::Float(f) => stack.push(Value::Float(f)),
            Token::Positional(index) => {
                let input = inputs.get(index.wrapping_sub(1)).ok_or_else(|| {
                    ExprError::BadReference {
                        token: raw.clone(),
                        index,
                        inputs: inputs.len(),
                        program: program.clone(),
                    }
                })?;
                stack.push(Value::Str(input.clone()));
            }
            Token::Placeholder(_) => {
                return Err(ExprError::UnresolvedPlaceholder {
                    token: raw.clone(),
                    program,
                });
            }
            Token::Func2(name) => match name.as_str() {
                "zerofill" => {
                    let width = pop(&mut stack, raw, &program)?;
                    let value = pop(&mut stack, raw, &program)?;
                    let width = width.as_int().filter(|w| *w >= 0).ok_or_else(|| {
                        ExprError::BadOperand {
                            token: raw.clone(),
                            expected: "non-negative integer width",
                            found: width.render(),
                            program: program.clone(),
                        }
                    })?;
                    stack.push(Value::Str(zerofill(&value.render(), width as usize)));
                }
                "prepend" => {
                    let prefix = pop(&mut stack, raw, &program)?;
                    let value = pop(&mut stack, raw, &program)?;
                    stack.push(Value::Str(format!("{prefix}{value}")));
                }
                other => {
                    return Err(ExprError::UnknownFunction {
                        name: other.to_string(),
                        program,
                    });
                }
            },
            // Everything else pushes its literal text. Operators and
            // one-argument functions are not part of this evaluator's
            // vocabulary.
            Token::Binary(_) | Token::Unary(_) | Token::Func1(_) | Token::Word(_) => {
                stack.push(Value::Str(raw.clone()));
            }
        }
    }

    finish(stack, program)
}

fn pop(stack: &mut Vec<Value>, token: &str, program: &[String]) -> Result<Value> {
    stack.pop().ok_or_else(|| ExprError::StackUnderflow {
        token: token.to_string(),
        program: program.to_vec(),
    })
}

fn finish(mut stack: Vec<Value>, program: Vec<String>) -> Result<Value> {
    if stack.len() != 1 {
        return Err(ExprError::Leftover {
            depth: stack.len(),
            program,
        });
    }
    Ok(stack.pop().expect("stack has exactly one value"))
}

/// Left-pads `value` with zeros to exactly `width` characters; values
/// already at least `width` long come back unchanged.
fn zerofill(value: &str, width: usize) -> String {
    if value.len() >= width {
        value.to_string()
    } else {
        let mut out = "0".repeat(width - value.len());
        out.push_str(value);
        out
    }
}

/// Substitutes `{key}` placeholders in each token from the context map.
/// Tokens without placeholders pass through untouched.
pub fn substitute_context(
    rpn: &[String],
    context: &std::collections::BTreeMap<String, String>,
) -> Vec<String> {
    rpn.iter()
        .map(|token| {
            let mut out = token.clone();
            for (key, value) in context {
                out = out.replace(&format!("{{{key}}}"), value);
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(tokens: &[&str]) -> Result<Value> {
        let rpn: Vec<String> = tokens.iter().map(|t| (*t).to_string()).collect();
        rpn_eval(&[], &rpn)
    }

    #[test]
    fn zerofill_pads_short_values() {
        let result = eval(&["7", "8", "zerofill(,)"]).unwrap();
        assert_eq!(result.render(), "00000007");
    }

    #[test]
    fn zerofill_leaves_wide_values_alone() {
        let result = eval(&["123456789", "8", "zerofill(,)"]).unwrap();
        assert_eq!(result.render(), "123456789");
    }

    #[test]
    fn prepend_concatenates_prefix_first() {
        let result = eval(&["12", "03", "prepend(,)"]).unwrap();
        assert_eq!(result.render(), "0312");
    }

    #[test]
    fn composite_identifier_program() {
        // visit zero-filled to 8, sensor to 2, raft to 1, assembled
        // back-to-front: raft + sensor + visit.
        let rpn = [
            "03455567",
            "8",
            "zerofill(,)",
            "2",
            "2",
            "zerofill(,)",
            "prepend(,)",
            "23",
            "1",
            "zerofill(,)",
            "prepend(,)",
        ];
        let result = eval(&rpn).unwrap();
        assert_eq!(result.render(), "230203455567");
    }

    #[test]
    fn leftover_stack_is_an_error() {
        assert!(matches!(
            eval(&["1", "2"]),
            Err(ExprError::Leftover { depth: 2, .. })
        ));
        assert!(matches!(eval(&[]), Err(ExprError::Leftover { depth: 0, .. })));
    }

    #[test]
    fn underflow_names_the_operator() {
        let err = eval(&["8", "zerofill(,)"]).unwrap_err();
        assert!(matches!(err, ExprError::StackUnderflow { .. }));
    }

    #[test]
    fn unknown_two_argument_function_is_an_error() {
        assert!(matches!(
            eval(&["1", "2", "frobnicate(,)"]),
            Err(ExprError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn unsubstituted_placeholder_is_an_error() {
        assert!(matches!(
            eval(&["{visit}"]),
            Err(ExprError::UnresolvedPlaceholder { .. })
        ));
    }

    #[test]
    fn substitution_rewrites_brace_tokens() {
        let mut context = std::collections::BTreeMap::new();
        context.insert("visit".to_string(), "7".to_string());
        let rpn = vec!["{visit}".to_string(), "8".to_string(), "zerofill(,)".to_string()];
        let substituted = substitute_context(&rpn, &context);
        assert_eq!(substituted[0], "7");
        let result = rpn_eval(&[], &substituted).unwrap();
        assert_eq!(result.render(), "00000007");
    }
}
