//! Domain error types.
//!
//! Two broad classes: invalid-request errors (the caller's input was bad)
//! and execution failures (the engine broke on acceptable input). Row-level
//! CSV integrity problems are not errors at all; the importer counts and
//! logs them, failing only when no valid rows remain.

/// Top-level error type for vistrader.
#[derive(Debug, thiserror::Error)]
pub enum VistraderError {
    #[error("invalid indicator input: {reason}")]
    IndicatorInput { reason: String },

    #[error("unknown condition type: {condition_type}")]
    UnknownConditionType { condition_type: String },

    #[error("{condition_type}: missing required parameter '{parameter}'")]
    MissingParameter {
        condition_type: String,
        parameter: String,
    },

    #[error("{condition_type}: invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        condition_type: String,
        parameter: String,
        reason: String,
    },

    #[error("CSV is missing required headers: {missing}")]
    CsvMissingHeaders { missing: String },

    #[error("CSV contained no valid data rows")]
    CsvEmpty,

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("backtest execution failed: {reason}")]
    ExecutionFailure { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VistraderError {
    /// Whether this error means the caller's input was bad, as opposed to
    /// the engine failing on acceptable input. The orchestrator prefers
    /// invalid-request errors when translating a batch failure.
    pub fn is_invalid_request(&self) -> bool {
        match self {
            VistraderError::IndicatorInput { .. }
            | VistraderError::UnknownConditionType { .. }
            | VistraderError::MissingParameter { .. }
            | VistraderError::InvalidParameter { .. }
            | VistraderError::CsvMissingHeaders { .. }
            | VistraderError::CsvEmpty
            | VistraderError::InvalidRequest { .. } => true,
            VistraderError::ExecutionFailure { .. } | VistraderError::Io(_) => false,
        }
    }
}

impl From<&VistraderError> for std::process::ExitCode {
    fn from(err: &VistraderError) -> Self {
        let code: u8 = match err {
            VistraderError::Io(_) => 1,
            VistraderError::UnknownConditionType { .. }
            | VistraderError::MissingParameter { .. }
            | VistraderError::InvalidParameter { .. }
            | VistraderError::InvalidRequest { .. } => 2,
            VistraderError::CsvMissingHeaders { .. } | VistraderError::CsvEmpty => 3,
            VistraderError::IndicatorInput { .. } => 4,
            VistraderError::ExecutionFailure { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
