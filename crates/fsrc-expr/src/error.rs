use thiserror::Error;

use fsrc_model::ModelError;

/// A malformed token program. Every variant carries the original token
/// list so the failing column's program can be reported verbatim.
#[derive(Debug, Error)]
pub enum ExprError {
    #[error("unknown token '{token}' in program {program:?}")]
    UnknownToken { token: String, program: Vec<String> },
    #[error("token '{token}' references input {index} but only {inputs} inputs are declared (program {program:?})")]
    BadReference {
        token: String,
        index: usize,
        inputs: usize,
        program: Vec<String>,
    },
    #[error("operator '{token}' found too few operands (program {program:?})")]
    StackUnderflow { token: String, program: Vec<String> },
    #[error("program left {depth} values on the stack, expected exactly one: {program:?}")]
    Leftover { depth: usize, program: Vec<String> },
    #[error("unknown function '{name}' (program {program:?})")]
    UnknownFunction { name: String, program: Vec<String> },
    #[error("placeholder '{token}' was not substituted before evaluation (program {program:?})")]
    UnresolvedPlaceholder { token: String, program: Vec<String> },
    #[error("'{token}' expects {expected}, found '{found}' (program {program:?})")]
    BadOperand {
        token: String,
        expected: &'static str,
        found: String,
        program: Vec<String>,
    },
    #[error("array program references unknown column '{0}'")]
    UnknownColumn(String),
    #[error(transparent)]
    Column(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ExprError>;
