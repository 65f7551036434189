//! Notion page links.
//!
//! A link is accepted when it looks like a URL and carries a Notion page id
//! (32 hex digits, plain or dashed 8-4-4-4-12).

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

use crate::documents::error::DocumentError;

static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https?://)?([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}([a-zA-Z0-9\-._~:/?#\[\]@!$&'()*+,;=]+)?$",
    )
    .unwrap()
});

static PAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([a-f0-9]{32})\b").unwrap());

static DASHED_PAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12})\b").unwrap()
});

static TRAILING_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-([^/-]+)$").unwrap());

/// Extract the page id, formatted as a dashed lower-case uuid.
///
/// The query string is ignored.
pub fn parse_page_id(link: &str) -> Option<String> {
    let without_query = link.split('?').next().unwrap_or(link);

    let raw = PAGE_ID
        .captures(without_query)
        .or_else(|| DASHED_PAGE_ID.captures(without_query))
        .and_then(|c| c.get(1))?
        .as_str()
        .replace('-', "")
        .to_ascii_lowercase();

    Some(format!(
        "{}-{}-{}-{}-{}",
        &raw[0..8],
        &raw[8..12],
        &raw[12..16],
        &raw[16..20],
        &raw[20..32]
    ))
}

/// Check a user-supplied link. Returns the trimmed link and its page id.
pub fn validate_link(link: Option<&str>) -> Result<(String, String), DocumentError> {
    let link = link.map(str::trim).filter(|l| !l.is_empty());
    let Some(link) = link else {
        return Err(DocumentError::MissingNotionLink);
    };

    if !URL_SHAPE.is_match(link) {
        return Err(DocumentError::InvalidNotionLink);
    }
    let page_id = parse_page_id(link).ok_or(DocumentError::InvalidNotionLink)?;

    Ok((link.to_string(), page_id))
}

/// Derive a document name from the first path segment of the link.
///
/// `https://acme.notion.site/Q3-Board-Update-0123…cdef` becomes `Q3 Board Update`.
pub fn page_name(link: &str) -> String {
    const FALLBACK: &str = "Notion Link";

    let absolute = if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{link}")
    };

    let segment = Url::parse(&absolute).ok().and_then(|url| {
        url.path_segments()
            .and_then(|mut s| s.next())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
    });

    let name = segment
        .map(|s| TRAILING_ID.replace(&s, "").replace('-', " "))
        .unwrap_or_default();

    if name.is_empty() {
        FALLBACK.to_string()
    } else {
        name
    }
}
