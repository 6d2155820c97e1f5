// Moderated Guestbook - Core
//
// Anonymous visitor submissions come in over HTTP, get posted to a Telegram
// review chat with Approve/Decline controls, and land in a git-backed content
// store once a reviewer approves. Declines delete the review message and
// leave no trace.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
