//! Submission lifecycle: form payload in, rendered display content out.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::{SubmissionId, SubmissionPayload},
    protocol::AnalysisResponse,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::SubmissionFailure,
    render::{render, DisplayContent},
    transport::AnalysisTransport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Submitting,
    Rendered,
    Failed,
}

impl LifecycleState {
    /// Any state other than `Submitting` accepts a new submission.
    pub fn is_resting(self) -> bool {
        self != LifecycleState::Submitting
    }
}

/// Region whose whole content is replaced on every update.
pub trait DisplayRegion: Send + Sync {
    fn replace(&self, content: DisplayContent);
}

/// The control that triggers submissions.
pub trait TriggerControl: Send + Sync {
    fn set_enabled(&self, enabled: bool);
    fn set_label(&self, label: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerLabels {
    pub idle: String,
    pub busy: String,
    pub placeholder: String,
}

impl Default for ControllerLabels {
    fn default() -> Self {
        Self {
            idle: "Analyze DNA".into(),
            busy: "Analyzing...".into(),
            placeholder: "Analyzing sequence, please wait...".into(),
        }
    }
}

/// Restores the idle affordance when dropped, including when the submit
/// future is dropped before the request settles.
struct BusyGuard<'a> {
    control: &'a dyn TriggerControl,
    idle_label: &'a str,
}

impl<'a> BusyGuard<'a> {
    fn engage(control: &'a dyn TriggerControl, labels: &'a ControllerLabels) -> Self {
        control.set_enabled(false);
        control.set_label(&labels.busy);
        Self {
            control,
            idle_label: &labels.idle,
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.control.set_label(self.idle_label);
        self.control.set_enabled(true);
    }
}

pub struct SubmissionController {
    transport: Arc<dyn AnalysisTransport>,
    display: Arc<dyn DisplayRegion>,
    control: Arc<dyn TriggerControl>,
    labels: ControllerLabels,
    state: watch::Sender<LifecycleState>,
    next_submission: AtomicU64,
}

impl SubmissionController {
    pub fn new(
        transport: Arc<dyn AnalysisTransport>,
        display: Arc<dyn DisplayRegion>,
        control: Arc<dyn TriggerControl>,
    ) -> Self {
        Self::with_labels(transport, display, control, ControllerLabels::default())
    }

    pub fn with_labels(
        transport: Arc<dyn AnalysisTransport>,
        display: Arc<dyn DisplayRegion>,
        control: Arc<dyn TriggerControl>,
        labels: ControllerLabels,
    ) -> Self {
        control.set_label(&labels.idle);
        control.set_enabled(true);
        let (state, _) = watch::channel(LifecycleState::Idle);
        Self {
            transport,
            display,
            control,
            labels,
            state,
            next_submission: AtomicU64::new(1),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    pub fn labels(&self) -> &ControllerLabels {
        &self.labels
    }

    /// Runs one submission to settlement and returns the state it rested in.
    ///
    /// Overlapping calls are not rejected; whichever settles last owns the
    /// display.
    pub async fn submit(&self, payload: SubmissionPayload) -> LifecycleState {
        let submission_id = SubmissionId(self.next_submission.fetch_add(1, Ordering::Relaxed));
        self.transition(submission_id, LifecycleState::Submitting);

        let _busy = BusyGuard::engage(self.control.as_ref(), &self.labels);
        self.display
            .replace(DisplayContent::busy(self.labels.placeholder.clone()));

        info!(
            %submission_id,
            sequence_len = payload.sequence.len(),
            age = ?payload.age,
            gender = ?payload.gender,
            "submitting analysis request"
        );

        let (next, response) = match self.exchange(submission_id, payload).await {
            Ok(response) => (LifecycleState::Rendered, response),
            Err(failure) => (LifecycleState::Failed, failure.to_response()),
        };

        self.display.replace(render(&response));
        self.transition(submission_id, next);
        next
    }

    /// Returns to `Idle` and clears the display.
    pub fn reset(&self) {
        self.display.replace(DisplayContent::empty());
        self.state.send_replace(LifecycleState::Idle);
    }

    async fn exchange(
        &self,
        submission_id: SubmissionId,
        payload: SubmissionPayload,
    ) -> Result<AnalysisResponse, SubmissionFailure> {
        let reply = self.transport.post_analysis(&payload).await;
        drop(payload);

        let reply = reply.map_err(|error| {
            warn!(%submission_id, %error, "analysis service unreachable");
            SubmissionFailure::Connectivity
        })?;

        let status_ok = reply.status.is_success();
        let response = AnalysisResponse::decode(status_ok, &reply.body).map_err(|error| {
            warn!(
                %submission_id,
                status = %reply.status,
                %error,
                "analysis service returned an undecodable body"
            );
            SubmissionFailure::InvalidResponse
        })?;

        match response {
            AnalysisResponse::Success(report) => {
                info!(
                    %submission_id,
                    conditions = report.results.len(),
                    "analysis succeeded"
                );
                Ok(AnalysisResponse::Success(report))
            }
            AnalysisResponse::Failure(body) => {
                info!(
                    %submission_id,
                    status = %reply.status,
                    error = body.error.as_deref().unwrap_or_default(),
                    "analysis service reported failure"
                );
                Err(SubmissionFailure::Service { error: body.error })
            }
        }
    }

    fn transition(&self, submission_id: SubmissionId, next: LifecycleState) {
        let previous = self.state.send_replace(next);
        debug!(%submission_id, ?previous, ?next, "lifecycle transition");
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
