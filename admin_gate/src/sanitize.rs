//! Stateless input cleaning and validation for form fields.
//!
//! Every function is pure. Invalid input yields `None`; nothing here errors.

use regex::Regex;
use std::sync::LazyLock;

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_EMAIL_LOCAL_LENGTH: usize = 64;
const MAX_FILE_NAME_BYTES: usize = 255;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

/// Remove markup, trim, and clip to at most `max_length` characters.
///
/// Tags are removed before clipping so a limit never cuts a tag in half.
/// A `<` with no closing `>` drops everything after it.
pub fn sanitize_text(input: &str, max_length: Option<usize>) -> String {
    let stripped = strip_tags(input);
    let trimmed = stripped.trim();

    match max_length {
        Some(max) => trimmed.chars().take(max).collect::<String>().trim().to_string(),
        None => trimmed.to_string(),
    }
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Parse a strictly positive whole number.
pub fn validate_integer(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|n| *n > 0)
}

/// Check the shape of an email address and return it with the domain lower-cased.
pub fn validate_email_address(value: &str) -> Option<String> {
    let value = value.trim();
    if value.len() > MAX_EMAIL_LENGTH || !EMAIL_SHAPE.is_match(value) {
        return None;
    }

    let (local, domain) = value.rsplit_once('@')?;
    if local.len() > MAX_EMAIL_LOCAL_LENGTH
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
    {
        return None;
    }

    Some(format!("{local}@{}", domain.to_ascii_lowercase()))
}

/// Accept an absolute `http`/`https` URL with a host, returning its normalized form.
pub fn validate_url(value: &str) -> Option<String> {
    let parsed = url::Url::parse(value.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Some(parsed.to_string()),
        _ => None,
    }
}

/// Reduce an uploaded file name to a safe base name.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '_'
        };
        // collapse runs of the same separator
        if matches!(c, '.' | '_' | '-') && out.ends_with(c) {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_start_matches('.');
    // Output is ASCII, so byte and char boundaries coincide.
    let clipped = &trimmed[..trimmed.len().min(MAX_FILE_NAME_BYTES)];

    (!clipped.is_empty()).then(|| clipped.to_string())
}
