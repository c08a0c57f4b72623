use shared::{error::ServiceErrorBody, protocol::AnalysisResponse};
use thiserror::Error;

pub const GENERIC_ERROR_MESSAGE: &str = "An unknown error occurred.";
pub const CONNECTIVITY_ERROR_MESSAGE: &str =
    "Could not reach the analysis service. Check your connection and try again.";
pub const INVALID_RESPONSE_MESSAGE: &str = "The analysis service returned an invalid response.";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid analysis service url '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("analysis request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Why a submission settled in the failed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// Non-success status; carries the service's `error` field when present.
    Service { error: Option<String> },
    /// The request never completed.
    Connectivity,
    /// The body could not be decoded into the expected shape.
    InvalidResponse,
}

impl SubmissionFailure {
    /// Error-shaped value handed to the renderer. A service failure without a
    /// message is left for the renderer's generic fallback.
    pub fn to_response(&self) -> AnalysisResponse {
        match self {
            SubmissionFailure::Service { error } => AnalysisResponse::Failure(ServiceErrorBody {
                error: error.clone(),
            }),
            SubmissionFailure::Connectivity => AnalysisResponse::failure(CONNECTIVITY_ERROR_MESSAGE),
            SubmissionFailure::InvalidResponse => AnalysisResponse::failure(INVALID_RESPONSE_MESSAGE),
        }
    }
}
