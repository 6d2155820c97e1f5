//! Submission model and rendering.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Raw `POST /` form payload.
///
/// `name` is the invisible honeypot field; the visible name field is `from`.
/// Everything is optional at this level so the handler can answer each
/// missing-field case with its own message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub captcha: Option<String>,
}

/// A visitor entry awaiting moderation.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Creation day plus millisecond disambiguator; filename stem of the
    /// attachment and of the committed entry.
    pub label: String,
    pub author_name: String,
    /// Normalized to an absolute URL (https:// prepended when missing).
    pub author_url: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        author_name: impl Into<String>,
        author_url: Option<String>,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let author_url = author_url
            .filter(|url| !url.is_empty())
            .map(normalize_url);
        let label = format!(
            "{}-{}-submission",
            created_at.format("%Y-%m-%d"),
            created_at.timestamp_millis()
        );

        Self {
            label,
            author_name: author_name.into(),
            author_url,
            body: body.into(),
            created_at,
        }
    }

    /// Attachment filename; doubles as the committed entry filename.
    pub fn file_name(&self) -> String {
        format!("{}.html", self.label)
    }

    /// The canonical text blob for this submission.
    ///
    /// This exact byte sequence is what the reviewer downloads and what gets
    /// committed on approval - header line, blank line, body, blank line.
    pub fn rendered_content(&self) -> String {
        let day = self.created_at.format("%Y-%m-%d");
        let link = match &self.author_url {
            Some(url) => format!(r#"(<a href="{url}">{url}</a>)"#),
            None => String::new(),
        };
        let header = format!("{} - {} {}", day, self.author_name, link);

        format!("\n{}\n\n{}\n\n", header.trim(), self.body)
    }
}

/// Bare hostnames are accepted on the form; anything without an http prefix
/// gets https:// prepended.
fn normalize_url(url: String) -> String {
    if url.starts_with("http") {
        url
    } else {
        format!("https://{url}")
    }
}
