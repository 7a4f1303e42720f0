//! Channel-backed human validation
//!
//! [`ChannelValidationAdapter`] implements the validation port by queueing
//! each escalation on a bounded channel. Whoever holds the matching
//! [`ReviewerHandle`] (a UI task, a chat bridge, a test) takes requests off
//! the queue and answers them.

use application::{ApplicationError, HumanValidationPort, ValidationResponse};
use async_trait::async_trait;
use domain::HumanFeedback;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

/// Collaborator name reported in failures
const REVIEWER: &str = "reviewer";

/// One escalation waiting for an answer
#[derive(Debug)]
pub struct ValidationRequest {
    feedback: HumanFeedback,
    reply: oneshot::Sender<ValidationResponse>,
}

impl ValidationRequest {
    /// What the reviewer is asked to validate
    #[must_use]
    pub const fn feedback(&self) -> &HumanFeedback {
        &self.feedback
    }

    /// Answer the request
    ///
    /// Returns `false` if the requesting cycle is no longer waiting.
    pub fn respond(self, response: ValidationResponse) -> bool {
        self.reply.send(response).is_ok()
    }

    /// Accept the interpretation as is
    pub fn confirm(self) -> bool {
        self.respond(ValidationResponse::Confirmed)
    }

    /// Replace the interpretation
    pub fn correct(self, text: impl Into<String>) -> bool {
        self.respond(ValidationResponse::Corrected(text.into()))
    }

    /// Decline to validate
    pub fn abandon(self) -> bool {
        self.respond(ValidationResponse::Abandoned)
    }
}

/// Reviewer end of the channel
#[derive(Debug)]
pub struct ReviewerHandle {
    requests: mpsc::Receiver<ValidationRequest>,
}

impl ReviewerHandle {
    /// Wait for the next request
    ///
    /// Returns `None` once every adapter has been dropped and the queue is
    /// empty.
    pub async fn next_request(&mut self) -> Option<ValidationRequest> {
        self.requests.recv().await
    }

    /// Take a queued request without waiting
    pub fn try_next_request(&mut self) -> Option<ValidationRequest> {
        self.requests.try_recv().ok()
    }
}

/// Validation port adapter feeding a [`ReviewerHandle`]
#[derive(Debug, Clone)]
pub struct ChannelValidationAdapter {
    requests: mpsc::Sender<ValidationRequest>,
}

impl ChannelValidationAdapter {
    /// Create an adapter and its reviewer handle
    ///
    /// At most `capacity` requests queue up; further escalations wait for
    /// room. A capacity of zero is raised to one.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, ReviewerHandle) {
        let (requests, receiver) = mpsc::channel(capacity.max(1));
        (
            Self { requests },
            ReviewerHandle {
                requests: receiver,
            },
        )
    }
}

#[async_trait]
impl HumanValidationPort for ChannelValidationAdapter {
    #[instrument(skip(self, feedback), fields(threshold = feedback.confidence_threshold))]
    async fn request_validation(
        &self,
        feedback: HumanFeedback,
    ) -> Result<ValidationResponse, ApplicationError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(ValidationRequest { feedback, reply })
            .await
            .map_err(|_| ApplicationError::backend_failure(REVIEWER, "reviewer disconnected"))?;
        debug!("Validation request queued");

        if let Ok(response) = response.await {
            Ok(response)
        } else {
            // the reviewer dropped the request unanswered
            warn!("Validation request dropped without an answer, abandoning");
            Ok(ValidationResponse::Abandoned)
        }
    }
}
