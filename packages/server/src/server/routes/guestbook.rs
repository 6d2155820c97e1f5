//! Public intake surface: the submission form and its POST handler.

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Form;
use chrono::Utc;
use tracing::{info, warn};

use crate::domains::guestbook::models::{Submission, SubmissionForm};
use crate::domains::guestbook::moderation::ModerationEvent;
use crate::server::app::AxumAppState;

/// Acknowledgment for accepted (and honeypot-trapped) submissions.
pub const PENDING_ACK: &str = "Thanks! Your message is pending approval.";

const CAPTCHA_NAG: &str = "Please solve the CAPTCHA correctly.";

const FORM_TEXT: &str = r#"<pre>
<form action="/" method="POST" accept-charset="UTF-8">
<input name="name" style="border: none; height: 0.1em" />
Name: <input name="from" />
Url (optional): <input name="url" />
Message:
<textarea name="message" cols="60" rows="18"></textarea>
CAPTCHA: Who owns this site? <input name="captcha" />
<button type="submit">Submit</button>
</form>
</pre>
"#;

pub async fn guestbook_form_handler() -> Html<&'static str> {
    Html(FORM_TEXT)
}

/// Validate and enqueue a submission.
///
/// Returns immediately in every case - the chat post and any later commit
/// happen on the moderation loop, never on the request path.
pub async fn submission_handler(
    Extension(state): Extension<AxumAppState>,
    Form(form): Form<SubmissionForm>,
) -> Result<String, (StatusCode, String)> {
    // Bots fill the invisible `name` field; humans never see it. Answer as
    // if accepted and drop the payload on the floor.
    if form.name.as_deref().is_some_and(|trap| !trap.is_empty()) {
        info!("honeypot tripped, discarding submission");
        return Ok(PENDING_ACK.to_string());
    }

    let captcha_ok = form
        .captcha
        .as_deref()
        .is_some_and(|answer| answer.to_lowercase().contains(&state.owner_name.to_lowercase()));
    if !captcha_ok {
        return Ok(CAPTCHA_NAG.to_string());
    }

    let Some(name) = form.from.filter(|name| !name.is_empty()) else {
        return Err((StatusCode::BAD_REQUEST, "Please provide a name.".to_string()));
    };
    let Some(message) = form.message.filter(|message| !message.is_empty()) else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please provide a message.".to_string(),
        ));
    };

    let submission = Submission::new(name, form.url, message, Utc::now());
    info!(label = %submission.label, "submission received");

    // Hand off without waiting on chat I/O. A full queue is a delivery
    // failure: logged, invisible to the submitter.
    if let Err(error) = state
        .events
        .try_send(ModerationEvent::SubmissionReceived(submission))
    {
        warn!(error = %error, "failed to enqueue submission for review");
    }

    Ok(PENDING_ACK.to_string())
}
