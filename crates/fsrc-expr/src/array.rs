//! Whole-column (bitwise/boolean) evaluation.
//!
//! Derived flag columns are computed from existing raw columns with a
//! restricted vocabulary: positional references plus `or`, `and`, `not`.
//! No literals, no functions.

use fsrc_model::{ColumnData, RawTable};

use crate::error::{ExprError, Result};
use crate::token::{Token, classify};

/// Evaluates an array program against columns of `raw`.
///
/// `inputs` names the source columns; `x1` refers to `inputs[0]`'s data.
/// The result is a new data array the caller wraps into a derived field.
pub fn rpn_eval_array(inputs: &[String], rpn: &[String], raw: &RawTable) -> Result<ColumnData> {
    for name in inputs {
        if !raw.contains(name) {
            return Err(ExprError::UnknownColumn(name.clone()));
        }
    }

    let program = rpn.to_vec();
    let mut stack: Vec<ColumnData> = Vec::new();

    for raw_token in rpn {
        match classify(raw_token) {
            Token::Positional(index) => {
                let name = inputs.get(index.wrapping_sub(1)).ok_or_else(|| {
                    ExprError::BadReference {
                        token: raw_token.clone(),
                        index,
                        inputs: inputs.len(),
                        program: program.clone(),
                    }
                })?;
                // Presence was checked above.
                let field = raw
                    .get(name)
                    .ok_or_else(|| ExprError::UnknownColumn(name.clone()))?;
                stack.push(field.data.clone());
            }
            Token::Binary(op @ ("or" | "and")) => {
                let first = pop(&mut stack, raw_token, &program)?;
                let second = pop(&mut stack, raw_token, &program)?;
                let combined = if op == "or" {
                    first.bit_or(&second)?
                } else {
                    first.bit_and(&second)?
                };
                stack.push(combined);
            }
            Token::Unary("not") => {
                let operand = pop(&mut stack, raw_token, &program)?;
                stack.push(operand.eq_zero()?);
            }
            _ => {
                return Err(ExprError::UnknownToken {
                    token: raw_token.clone(),
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

fn pop(stack: &mut Vec<ColumnData>, token: &str, program: &[String]) -> Result<ColumnData> {
    stack.pop().ok_or_else(|| ExprError::StackUnderflow {
        token: token.to_string(),
        program: program.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsrc_model::Field;

    fn flags_table() -> RawTable {
        let mut table = RawTable::new();
        table
            .insert(Field::new(
                "flag_a",
                ColumnData::Bool(vec![true, false, false]),
                "",
            ))
            .unwrap();
        table
            .insert(Field::new(
                "flag_b",
                ColumnData::Bool(vec![false, false, true]),
                "",
            ))
            .unwrap();
        table
            .insert(Field::new("mask", ColumnData::I32(vec![0, 3, 0]), ""))
            .unwrap();
        table
    }

    fn program(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn or_combines_flag_columns() {
        let table = flags_table();
        let inputs = program(&["flag_a", "flag_b"]);
        let out = rpn_eval_array(&inputs, &program(&["x1", "x2", "or"]), &table).unwrap();
        assert_eq!(out, ColumnData::Bool(vec![true, false, true]));
    }

    #[test]
    fn not_is_compare_equal_zero() {
        let table = flags_table();
        let inputs = program(&["mask"]);
        let out = rpn_eval_array(&inputs, &program(&["x1", "not"]), &table).unwrap();
        assert_eq!(out, ColumnData::Bool(vec![true, false, true]));
    }

    #[test]
    fn missing_column_fails_up_front() {
        let table = flags_table();
        let inputs = program(&["absent"]);
        assert!(matches!(
            rpn_eval_array(&inputs, &program(&["x1"]), &table),
            Err(ExprError::UnknownColumn(_))
        ));
    }

    #[test]
    fn literals_are_not_part_of_the_vocabulary() {
        let table = flags_table();
        assert!(matches!(
            rpn_eval_array(&[], &program(&["1"]), &table),
            Err(ExprError::UnknownToken { .. })
        ));
    }
}
