pub mod guestbook;
pub mod health;

pub use guestbook::{guestbook_form_handler, submission_handler};
pub use health::health_handler;
