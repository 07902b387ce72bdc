use thiserror::Error;

/// Why a single step failed.
///
/// Every transition helper returns these through `?`; `machine::step_forward` is the only
/// place that turns one into the `error` string of a `State`, which ends the trace.
/// `during` is always the raw text of the instruction being executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    // Structural underflow.
    #[error("stack underflow during {during}")]
    StackUnderflow { during: String },
    #[error("metacontext underflow during {during}")]
    MetaUnderflow { during: String },

    // Shape mismatch.
    #[error("expected data on stack during {during}, found a control entry")]
    ExpectedData { during: String },
    #[error("expected control entry on stack during {during}, found data")]
    ExpectedControl { during: String },
    #[error("expected {expected} during {during}, found {found}")]
    MetaMismatch { expected: &'static str, found: &'static str, during: String },
    #[error("expected classifier on stack during {during}, found {found}")]
    ExpectedClassifier { found: String, during: String },

    // Type mismatch.
    #[error("type mismatch during {during}: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String, during: String },

    // Unresolved reference.
    #[error("{0} not found")]
    NotFound(String),

    // Malformed input.
    #[error("missing name after :")]
    MissingName,
    #[error("{during} executed outside the token stream")]
    OutsideTokenStream { during: String },
    #[error("program counter {0} does not address an instruction")]
    PcOutOfBounds(String),
}

impl StepError {
    pub fn stack_underflow(during: &str) -> Self { StepError::StackUnderflow { during: during.to_string() } }

    pub fn meta_underflow(during: &str) -> Self { StepError::MetaUnderflow { during: during.to_string() } }

    pub fn expected_data(during: &str) -> Self { StepError::ExpectedData { during: during.to_string() } }

    pub fn expected_control(during: &str) -> Self { StepError::ExpectedControl { during: during.to_string() } }

    pub fn meta_mismatch(expected: &'static str, found: &'static str, during: &str) -> Self {
        StepError::MetaMismatch { expected, found, during: during.to_string() }
    }
}
