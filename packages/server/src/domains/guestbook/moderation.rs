//! Moderation lifecycle: pending review messages, reviewer decisions, and
//! the hand-off between intake and the commit pipeline.
//!
//! A single `ModerationLoop` owns the whole lifecycle. Intake and the update
//! pump push `ModerationEvent`s into one bounded channel; the loop consumes
//! them strictly in arrival order, so two presses on the same review message
//! serialize here without any locking.

use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::models::Submission;
use crate::kernel::{BaseContentStore as _, BaseReviewChannel as _, ServerDeps};

/// Reviewer decision, decoded from a control payload at the adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve(i64),
    Decline(i64),
}

impl ReviewAction {
    /// Wire format carried in button payloads: `approve:{message_id}` /
    /// `decline:{message_id}`.
    pub fn encode(&self) -> String {
        match self {
            Self::Approve(message_id) => format!("approve:{message_id}"),
            Self::Decline(message_id) => format!("decline:{message_id}"),
        }
    }

    pub fn decode(data: &str) -> Option<Self> {
        let (action, message_id) = data.split_once(':')?;
        let message_id = message_id.parse().ok()?;
        match action {
            "approve" => Some(Self::Approve(message_id)),
            "decline" => Some(Self::Decline(message_id)),
            _ => None,
        }
    }

    pub fn message_id(&self) -> i64 {
        match self {
            Self::Approve(message_id) | Self::Decline(message_id) => *message_id,
        }
    }
}

/// Reference to the attachment carried by the review message.
#[derive(Debug, Clone)]
pub struct AttachmentRef {
    pub file_id: String,
    pub file_name: Option<String>,
}

/// A reviewer pressed one of the controls on a review message.
#[derive(Debug, Clone)]
pub struct ControlActivation {
    pub action: ReviewAction,
    pub attachment: Option<AttachmentRef>,
}

/// Correlation record binding a posted review message to its submission.
///
/// There is no database behind this: the chat message itself is the durable
/// record of a pending submission, and `message_id` is the only key.
#[derive(Debug, Clone)]
pub struct ReviewTicket {
    pub message_id: i64,
    pub label: String,
}

/// Work items crossing into the moderation loop.
#[derive(Debug)]
pub enum ModerationEvent {
    SubmissionReceived(Submission),
    ControlActivated(ControlActivation),
}

/// Drives each submission through Pending -> {Approved, Declined}.
pub struct ModerationLoop {
    events: mpsc::Receiver<ModerationEvent>,
    deps: ServerDeps,
    /// Open tickets by message id.
    pending: HashMap<i64, ReviewTicket>,
    /// Message ids that already saw a terminal action; replays are no-ops.
    resolved: HashSet<i64>,
}

impl ModerationLoop {
    pub fn new(events: mpsc::Receiver<ModerationEvent>, deps: ServerDeps) -> Self {
        Self {
            events,
            deps,
            pending: HashMap::new(),
            resolved: HashSet::new(),
        }
    }

    /// Run until every event sender is dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            self.handle(event).await;
        }
        info!("moderation loop stopped: all event senders closed");
    }

    async fn handle(&mut self, event: ModerationEvent) {
        match event {
            ModerationEvent::SubmissionReceived(submission) => {
                self.post_for_review(submission).await;
            }
            ModerationEvent::ControlActivated(activation) => {
                self.apply_decision(activation).await;
            }
        }
    }

    async fn post_for_review(&mut self, submission: Submission) {
        match self.deps.review_channel.post(&submission).await {
            Ok(ticket) => {
                info!(
                    message_id = ticket.message_id,
                    label = %ticket.label,
                    "submission posted for review"
                );
                self.pending.insert(ticket.message_id, ticket);
            }
            Err(error) => {
                // Delivery failure is terminal: no ticket exists, the
                // submission is dropped, and the visitor already got the
                // generic acknowledgment.
                error!(
                    label = %submission.label,
                    error = %error,
                    "failed to post submission for review"
                );
            }
        }
    }

    async fn apply_decision(&mut self, activation: ControlActivation) {
        let message_id = activation.action.message_id();
        if self.resolved.contains(&message_id) {
            warn!(message_id, "ignoring control activation for resolved message");
            return;
        }

        match activation.action {
            ReviewAction::Decline(_) => self.decline(message_id).await,
            ReviewAction::Approve(_) => self.approve(message_id, activation).await,
        }
    }

    async fn decline(&mut self, message_id: i64) {
        // Deleting the review message is the whole of decline: no PII is
        // retained for rejected submissions.
        if let Err(error) = self.deps.review_channel.withdraw(message_id).await {
            error!(message_id, error = %error, "failed to delete declined submission");
            return;
        }
        self.pending.remove(&message_id);
        self.resolved.insert(message_id);
        info!(message_id, "submission declined");
    }

    async fn approve(&mut self, message_id: i64, activation: ControlActivation) {
        let entry_file_name = self.entry_file_name(message_id, &activation);

        let attachment = match self.deps.review_channel.fetch_attachment(&activation).await {
            Ok(path) => path,
            Err(error) => {
                error!(message_id, error = %error, "failed to fetch approved attachment");
                self.acknowledge(message_id, &format!("approval failed: {error}"))
                    .await;
                return;
            }
        };

        match self
            .deps
            .content_store
            .publish(&attachment, &entry_file_name, message_id)
            .await
        {
            Ok(()) => {
                self.pending.remove(&message_id);
                self.resolved.insert(message_id);
                info!(message_id, entry = %entry_file_name, "submission approved and committed");
                self.acknowledge(message_id, "ok").await;
            }
            Err(error) => {
                // The message id stays unresolved: a failed commit is not a
                // terminal action, so the reviewer may press Approve again
                // once the remote is fixed. Nothing partial reached it.
                error!(message_id, error = %error, "commit pipeline failed");
                self.acknowledge(message_id, &format!("commit failed: {error}"))
                    .await;
            }
        }
    }

    /// Filename of the committed entry. The review message's own attachment
    /// name is authoritative (it survives process restarts); the open ticket
    /// is the fallback.
    fn entry_file_name(&self, message_id: i64, activation: &ControlActivation) -> String {
        if let Some(name) = activation
            .attachment
            .as_ref()
            .and_then(|attachment| attachment.file_name.clone())
        {
            return name;
        }
        if let Some(ticket) = self.pending.get(&message_id) {
            return format!("{}.html", ticket.label);
        }
        format!("{message_id}-submission.html")
    }

    async fn acknowledge(&self, message_id: i64, text: &str) {
        if let Err(error) = self.deps.review_channel.acknowledge(message_id, text).await {
            warn!(message_id, error = %error, "failed to reply with review outcome");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_payloads_round_trip() {
        let approve = ReviewAction::Approve(1001);
        assert_eq!(approve.encode(), "approve:1001");
        assert_eq!(ReviewAction::decode("approve:1001"), Some(approve));

        let decline = ReviewAction::Decline(-5);
        assert_eq!(ReviewAction::decode(&decline.encode()), Some(decline));
    }

    #[test]
    fn malformed_payloads_decode_to_none() {
        assert_eq!(ReviewAction::decode("approve"), None);
        assert_eq!(ReviewAction::decode("approve:abc"), None);
        assert_eq!(ReviewAction::decode("publish:12"), None);
        assert_eq!(ReviewAction::decode(""), None);
    }
}
