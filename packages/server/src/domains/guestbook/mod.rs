//! Guestbook domain - submission intake, moderation lifecycle, publishing.

pub mod models;
pub mod moderation;
pub mod publish;

// Explicit re-exports to avoid ambiguous glob re-exports
pub use models::{Submission, SubmissionForm};
pub use moderation::{
    AttachmentRef, ControlActivation, ModerationEvent, ModerationLoop, ReviewAction, ReviewTicket,
};
pub use publish::{CommitError, GitContentStore, GitIdentity};
