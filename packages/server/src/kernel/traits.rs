// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - the moderation lifecycle lives in
// the guestbook domain and talks to the outside world through these seams.
//
// Naming convention: Base* for trait names (e.g., BaseReviewChannel)

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::guestbook::models::Submission;
use crate::domains::guestbook::moderation::{ControlActivation, ReviewTicket};
use crate::domains::guestbook::publish::CommitError;

// =============================================================================
// Review Channel Trait (Infrastructure - chat capability)
// =============================================================================

#[async_trait]
pub trait BaseReviewChannel: Send + Sync {
    /// Post a submission for review with its attachment and controls.
    /// Returns the correlation ticket for the posted message.
    async fn post(&self, submission: &Submission) -> Result<ReviewTicket>;

    /// Remove a pending review message (decline path).
    async fn withdraw(&self, message_id: i64) -> Result<()>;

    /// Download the attachment behind an activation to a scratch path,
    /// byte-for-byte as the reviewer saw it.
    async fn fetch_attachment(&self, activation: &ControlActivation) -> Result<PathBuf>;

    /// Reply to the review message with an outcome notice.
    async fn acknowledge(&self, message_id: i64, text: &str) -> Result<()>;
}

// =============================================================================
// Content Store Trait (Infrastructure - version-control capability)
// =============================================================================

#[async_trait]
pub trait BaseContentStore: Send + Sync {
    /// Persist an approved entry under `entry_file_name`, tagging the commit
    /// with the correlation id. Either the whole entry reaches the remote or
    /// nothing does.
    async fn publish(
        &self,
        attachment: &Path,
        entry_file_name: &str,
        message_id: i64,
    ) -> std::result::Result<(), CommitError>;
}
