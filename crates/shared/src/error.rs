use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures while capturing form values into a submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("DNA sequence is required")]
    MissingSequence,
    #[error("age must be a whole number, got '{0}'")]
    InvalidAge(String),
    #[error("age must be between 0 and {max}, got {value}", max = crate::domain::MAX_AGE)]
    AgeOutOfRange { value: u32 },
    #[error("gender must be M or F (or left blank), got '{0}'")]
    InvalidGender(String),
}

/// Body the analysis service sends alongside a non-success status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
        }
    }
}
