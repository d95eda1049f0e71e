//! Message body normalization.

use std::sync::OnceLock;

use regex::Regex;

/// Content type of a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    /// Plain text, used as-is.
    #[default]
    Text,
    /// HTML markup, tags are stripped.
    Html,
}

#[allow(clippy::expect_used)]
fn markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<.*?>").expect("invalid markup regex"))
}

/// Normalizes a message body into plain text for extraction.
///
/// Plain text passes through unchanged. For HTML every `<...>` span is
/// removed with a non-greedy match; entities and whitespace are left alone.
/// A missing body yields an empty string.
#[must_use]
pub fn normalize(content: Option<&str>, body_type: BodyType) -> String {
    let Some(content) = content.filter(|c| !c.is_empty()) else {
        return String::new();
    };

    match body_type {
        BodyType::Text => content.to_string(),
        BodyType::Html => markup_re().replace_all(content, "").into_owned(),
    }
}
