// Mock capability implementations for moderation tests.
//
// Both mocks record every call behind Arc<Mutex<..>> so tests can assert on
// what the moderation loop actually did.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use guestbook_core::domains::guestbook::models::Submission;
use guestbook_core::domains::guestbook::moderation::{ControlActivation, ReviewTicket};
use guestbook_core::domains::guestbook::publish::CommitError;
use guestbook_core::kernel::{BaseContentStore, BaseReviewChannel};

/// First message id handed out by the mock channel; deterministic so tests
/// can address messages without plumbing ids around.
pub const FIRST_MESSAGE_ID: i64 = 1000;

/// A message posted to the mock review channel.
#[derive(Debug, Clone)]
pub struct PostedMessage {
    pub message_id: i64,
    pub file_name: String,
    pub content: Vec<u8>,
}

// =============================================================================
// Mock Review Channel
// =============================================================================

pub struct MockReviewChannel {
    next_message_id: Mutex<i64>,
    fail_posts: bool,
    posted: Arc<Mutex<Vec<PostedMessage>>>,
    withdrawn: Arc<Mutex<Vec<i64>>>,
    replies: Arc<Mutex<Vec<(i64, String)>>>,
    attachments: Arc<Mutex<HashMap<String, PathBuf>>>,
}

impl MockReviewChannel {
    pub fn new() -> Self {
        Self {
            next_message_id: Mutex::new(FIRST_MESSAGE_ID),
            fail_posts: false,
            posted: Arc::new(Mutex::new(Vec::new())),
            withdrawn: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(Vec::new())),
            attachments: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Channel whose posts always fail (delivery failure path).
    pub fn failing_posts() -> Self {
        Self {
            fail_posts: true,
            ..Self::new()
        }
    }

    /// Register a scratch file the channel will hand out for `file_id`.
    pub fn stage_attachment(&self, file_id: &str, path: PathBuf) {
        self.attachments
            .lock()
            .unwrap()
            .insert(file_id.to_string(), path);
    }

    pub fn posted(&self) -> Vec<PostedMessage> {
        self.posted.lock().unwrap().clone()
    }

    pub fn was_withdrawn(&self, message_id: i64) -> bool {
        self.withdrawn.lock().unwrap().contains(&message_id)
    }

    pub fn replies(&self) -> Vec<(i64, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseReviewChannel for MockReviewChannel {
    async fn post(&self, submission: &Submission) -> Result<ReviewTicket> {
        if self.fail_posts {
            return Err(anyhow!("review channel unavailable"));
        }

        let mut next = self.next_message_id.lock().unwrap();
        *next += 1;
        let message_id = *next;

        self.posted.lock().unwrap().push(PostedMessage {
            message_id,
            file_name: submission.file_name(),
            content: submission.rendered_content().into_bytes(),
        });

        Ok(ReviewTicket {
            message_id,
            label: submission.label.clone(),
        })
    }

    async fn withdraw(&self, message_id: i64) -> Result<()> {
        self.withdrawn.lock().unwrap().push(message_id);
        Ok(())
    }

    async fn fetch_attachment(&self, activation: &ControlActivation) -> Result<PathBuf> {
        let attachment = activation
            .attachment
            .as_ref()
            .ok_or_else(|| anyhow!("activation carries no attachment"))?;
        self.attachments
            .lock()
            .unwrap()
            .get(&attachment.file_id)
            .cloned()
            .ok_or_else(|| anyhow!("no staged attachment for {}", attachment.file_id))
    }

    async fn acknowledge(&self, message_id: i64, text: &str) -> Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((message_id, text.to_string()));
        Ok(())
    }
}

// =============================================================================
// Mock Content Store
// =============================================================================

/// An entry the mock store accepted.
#[derive(Debug, Clone)]
pub struct PublishedEntry {
    pub entry_file_name: String,
    pub content: Vec<u8>,
    pub message_id: i64,
}

pub struct MockContentStore {
    fail_step: Option<&'static str>,
    published: Arc<Mutex<Vec<PublishedEntry>>>,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self {
            fail_step: None,
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Store whose publishes fail as if git `step` rejected the operation.
    pub fn failing_at(step: &'static str) -> Self {
        Self {
            fail_step: Some(step),
            ..Self::new()
        }
    }

    pub fn published(&self) -> Vec<PublishedEntry> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseContentStore for MockContentStore {
    async fn publish(
        &self,
        attachment: &Path,
        entry_file_name: &str,
        message_id: i64,
    ) -> std::result::Result<(), CommitError> {
        if let Some(step) = self.fail_step {
            return Err(CommitError::Git {
                step,
                stderr: "remote rejected the operation".to_string(),
            });
        }

        let content = std::fs::read(attachment).map_err(|source| CommitError::Place {
            entry: entry_file_name.to_string(),
            source,
        })?;
        self.published.lock().unwrap().push(PublishedEntry {
            entry_file_name: entry_file_name.to_string(),
            content,
            message_id,
        });
        Ok(())
    }
}
