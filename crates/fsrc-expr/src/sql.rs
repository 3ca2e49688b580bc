//! Textual (SQL-expression) evaluation.
//!
//! Instead of computing a value, this evaluator composes the expression
//! string the database will evaluate later, e.g. as a view column
//! definition. Composition is WYSIWYG: a binary operator prints the first
//! popped operand first, so programs written for this evaluator read in
//! pop order.

use crate::error::{ExprError, Result};
use crate::token::{Token, classify, sql_function_name};

/// Renders a postfix program to a SQL expression string over the named
/// inputs (`x1` is `inputs[0]` and so on).
pub fn rpn_to_sql(inputs: &[String], rpn: &[String]) -> Result<String> {
    let program = rpn.to_vec();
    let mut stack: Vec<String> = Vec::new();

    for raw in rpn {
        match classify(raw) {
            // Literal numeric text passes through as written.
            Token::Int(_) | Token::Float(_) => stack.push(raw.clone()),
            Token::Positional(index) => {
                let input = inputs.get(index.wrapping_sub(1)).ok_or_else(|| {
                    ExprError::BadReference {
                        token: raw.clone(),
                        index,
                        inputs: inputs.len(),
                        program: program.clone(),
                    }
                })?;
                stack.push(input.clone());
            }
            // Placeholders stay literal; they are substituted downstream
            // (band expansion, err/flux naming).
            Token::Placeholder(_) => stack.push(raw.clone()),
            Token::Binary(op) => {
                let first = pop(&mut stack, raw, &program)?;
                let second = pop(&mut stack, raw, &program)?;
                stack.push(format!("({first} {op} {second})"));
            }
            Token::Unary(op) => {
                let operand = pop(&mut stack, raw, &program)?;
                stack.push(format!("({op} {operand})"));
            }
            Token::Func1(name) => {
                let operand = pop(&mut stack, raw, &program)?;
                stack.push(format!("{}({operand})", sql_function_name(&name)));
            }
            Token::Func2(name) => {
                let first = pop(&mut stack, raw, &program)?;
                let second = pop(&mut stack, raw, &program)?;
                stack.push(format!("{}({first},{second})", sql_function_name(&name)));
            }
            Token::Word(_) => {
                return Err(ExprError::UnknownToken {
                    token: raw.clone(),
                    program,
                });
            }
        }
    }

    if stack.len() != 1 {
        return Err(ExprError::Leftover {
            depth: stack.len(),
            program,
        });
    }
    Ok(stack.pop().expect("stack has exactly one value"))
}

fn pop(stack: &mut Vec<String>, token: &str, program: &[String]) -> Result<String> {
    stack.pop().ok_or_else(|| ExprError::StackUnderflow {
        token: token.to_string(),
        program: program.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_sql(inputs: &[&str], tokens: &[&str]) -> Result<String> {
        let inputs: Vec<String> = inputs.iter().map(|s| (*s).to_string()).collect();
        let rpn: Vec<String> = tokens.iter().map(|t| (*t).to_string()).collect();
        rpn_to_sql(&inputs, &rpn)
    }

    #[test]
    fn binary_operands_print_in_pop_order() {
        let sql = to_sql(&["a", "b"], &["x1", "x2", "-"]).unwrap();
        assert_eq!(sql, "(b - a)");
    }

    #[test]
    fn nested_expression() {
        let sql = to_sql(&["flux", "err"], &["x1", "x2", "+", "x1", "*"]).unwrap();
        assert_eq!(sql, "(flux * (err + flux))");
    }

    #[test]
    fn functions_and_quoting() {
        let sql = to_sql(&["v"], &["x1", "sqrt()"]).unwrap();
        assert_eq!(sql, "sqrt(v)");

        let sql = to_sql(&["a", "b"], &["x1", "x2", "pg:power(,)"]).unwrap();
        assert_eq!(sql, "\"pg:power\"(b,a)");
    }

    #[test]
    fn placeholders_pass_through() {
        let sql = to_sql(&["{BAND}_flux"], &["x1", "log()"]).unwrap();
        assert_eq!(sql, "log({BAND}_flux)");
    }

    #[test]
    fn unknown_word_is_an_error() {
        assert!(matches!(
            to_sql(&[], &["garbage"]),
            Err(ExprError::UnknownToken { .. })
        ));
    }

    #[test]
    fn out_of_range_reference_is_an_error() {
        assert!(matches!(
            to_sql(&["only"], &["x2"]),
            Err(ExprError::BadReference { index: 2, .. })
        ));
    }
}
