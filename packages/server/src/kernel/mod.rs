//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod telegram;
pub mod traits;

pub use deps::ServerDeps;
pub use self::telegram::{TelegramAdapter, TelegramUpdatePump};
pub use traits::*;
