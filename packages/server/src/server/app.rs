//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::get,
    Router,
};
use telegram::{TelegramOptions, TelegramService};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::guestbook::moderation::{ModerationEvent, ModerationLoop};
use crate::domains::guestbook::publish::GitContentStore;
use crate::kernel::{ServerDeps, TelegramAdapter, TelegramUpdatePump};
use crate::server::routes::{guestbook_form_handler, health_handler, submission_handler};

/// Hand-off queue depth between intake and the moderation loop. Plenty for a
/// low-volume guestbook; overflow is treated as a delivery failure.
const EVENT_QUEUE_CAPACITY: usize = 64;

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    /// Cross-context hand-off into the moderation loop. Intake only ever
    /// `try_send`s on this - it never blocks on chat I/O or commits.
    pub events: mpsc::Sender<ModerationEvent>,
    pub owner_name: String,
}

/// Build the Axum application router and spawn the moderation machinery.
///
/// Everything is constructed once here and passed by handle - no ambient
/// globals. The moderation loop and the update pump run as background tasks
/// for the life of the process, the loop being the single consumer that
/// serializes reviewer decisions.
pub fn build_app(config: &Config) -> Router {
    let mut options = TelegramOptions::new(config.bot_token.clone());
    if let Some(api_base) = &config.telegram_api_base {
        options = options.with_api_base(api_base.clone());
    }
    let telegram = Arc::new(TelegramService::new(options));

    let deps = ServerDeps::new(
        Arc::new(TelegramAdapter::new(telegram.clone(), config.chat_id)),
        Arc::new(GitContentStore::new(config.repo_clone_url.clone())),
    );

    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

    let moderation = ModerationLoop::new(events_rx, deps);
    tokio::spawn(moderation.run());

    let pump = TelegramUpdatePump::new(telegram, config.chat_id, events_tx.clone());
    tokio::spawn(pump.run());

    build_router(AxumAppState {
        events: events_tx,
        owner_name: config.owner_name.clone(),
    })
}

/// Router assembly, separated so tests can drive the HTTP surface with their
/// own state and no live Telegram connection.
pub fn build_router(app_state: AxumAppState) -> Router {
    Router::new()
        .route("/", get(guestbook_form_handler).post(submission_handler))
        .route("/health", get(health_handler))
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
}
