//! Client side of the sequence analysis service: HTTP transport, the
//! submission lifecycle controller, and the result renderer.

pub mod controller;
pub mod error;
pub mod render;
pub mod transport;

pub use controller::{
    ControllerLabels, DisplayRegion, LifecycleState, SubmissionController, TriggerControl,
};
pub use error::{SubmissionFailure, TransportError};
pub use render::{render, DisplayBlock, DisplayContent, ResultCard};
pub use transport::{AnalysisTransport, HttpAnalysisTransport, TransportReply};
