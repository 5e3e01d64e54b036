use thiserror::Error;

/// Failure of a single estimate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimationError {
    /// No usable observations remained after filtering, or their weights
    /// summed to zero.
    #[error("no valid values found for variable '{variable}'")]
    EmptySample { variable: String },
}

impl EstimationError {
    pub(crate) fn empty(variable: &str) -> Self {
        EstimationError::EmptySample {
            variable: variable.to_owned(),
        }
    }

    /// The variable the failure refers to.
    pub fn variable(&self) -> &str {
        match self {
            EstimationError::EmptySample { variable } => variable,
        }
    }
}
