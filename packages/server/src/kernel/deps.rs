//! Server dependencies for the moderation loop (traits for testability)

use std::sync::Arc;

use crate::kernel::traits::{BaseContentStore, BaseReviewChannel};

/// Dependency container handed to the moderation loop.
///
/// Constructed once at startup and passed by handle - no ambient globals.
#[derive(Clone)]
pub struct ServerDeps {
    pub review_channel: Arc<dyn BaseReviewChannel>,
    pub content_store: Arc<dyn BaseContentStore>,
}

impl ServerDeps {
    pub fn new(
        review_channel: Arc<dyn BaseReviewChannel>,
        content_store: Arc<dyn BaseContentStore>,
    ) -> Self {
        Self {
            review_channel,
            content_store,
        }
    }
}
