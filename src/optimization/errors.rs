//! optimization::errors — error bridge between the evaluator and `argmin`.
//!
//! `argmin` problems return `argmin::core::Error`, which is an
//! `anyhow::Error`. [`OptError`] is what this crate puts inside it and what
//! callers get back after converting an `argmin` failure with `From`.

use anyhow::Error;
use argmin::core::ArgminError;

use crate::density::errors::DensityError;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- Density ----
    /// Evaluator rejected the parameter vector.
    Density(DensityError),

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Cost function returned a non-finite value: {value}")
            }

            // ---- Density ----
            OptError::Density(err) => write!(f, "Density evaluation failed: {err}"),

            // ---- Argmin ---
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<DensityError> for OptError {
    fn from(err: DensityError) -> Self {
        OptError::Density(err)
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // An `OptError` boxed into `anyhow::Error` comes back unchanged.
    fn opt_error_round_trips_through_anyhow() {
        let original = OptError::Density(DensityError::EmptyMean);
        let boxed: Error = original.clone().into();
        assert_eq!(OptError::from(boxed), original);
    }

    #[test]
    // Purpose
    // -------
    // `ArgminError` variants map onto their `OptError` counterparts and
    // unrelated errors become `BackendError`.
    fn argmin_and_foreign_errors_are_mapped() {
        // Arrange
        let argmin_err: Error = ArgminError::NotImplemented { text: "hessian".to_string() }.into();
        let foreign: Error = anyhow::anyhow!("disk on fire");

        // Act / Assert
        assert_eq!(
            OptError::from(argmin_err),
            OptError::NotImplemented { text: "hessian".to_string() }
        );
        match OptError::from(foreign) {
            OptError::BackendError { text } => assert!(text.contains("disk on fire")),
            other => panic!("expected BackendError, got {other:?}"),
        }
    }
}
