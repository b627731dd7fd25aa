//! Error types.
//!
//! - `ModelError`: typed failures of the estimation core (survey model, death
//!   distribution, Bayes estimator). Library callers match on these.
//! - `AppError`: what the `handage` binary reports; carries the process exit code.
//!
//! Exit codes:
//! - `2` bad input, configuration, or file IO
//! - `3` data validation (malformed or empty tables)
//! - `4` runtime failure (network, computation, rendering)

/// Failures of the estimation core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// A query age has no data behind it and no extrapolation rule covers it.
    #[error("Age {age} is out of range: {reason}")]
    AgeOutOfRange { age: i32, reason: String },

    /// An input table violates its construction contract.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A normalizing denominator is zero.
    #[error("Division by zero: {0}")]
    DivisionByZero(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        let exit_code = match err {
            ModelError::MalformedInput(_) => 3,
            ModelError::AgeOutOfRange { .. } | ModelError::DivisionByZero(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_map_to_exit_codes() {
        let malformed: AppError = ModelError::MalformedInput("ages not contiguous".into()).into();
        assert_eq!(malformed.exit_code(), 3);
        assert_eq!(malformed.to_string(), "Malformed input: ages not contiguous");

        let gap: AppError = ModelError::AgeOutOfRange {
            age: 40,
            reason: "birth year 1950 missing from survey".into(),
        }
        .into();
        assert_eq!(gap.exit_code(), 4);
        assert!(gap.to_string().contains("Age 40"));

        let zero: AppError = ModelError::DivisionByZero("P(RH) = 0".into()).into();
        assert_eq!(zero.exit_code(), 4);
    }
}
