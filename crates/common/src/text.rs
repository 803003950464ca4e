use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

/// Links are recognised by an explicit `http(s)://` scheme or a bare `www.` prefix.
/// Anything else (for example `paytm-reward.xyz`) is plain text.
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("invalid url regex"));

/// Canonical form of a message as seen by the classifier: lower-cased, links removed,
/// and reduced to `[a-z0-9 ]`.
pub fn normalize_message(input: &str) -> String {
    let lowered = input.to_lowercase();
    let without_links = URL_RE.replace_all(&lowered, "");
    without_links
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect()
}

/// Links in order of appearance. Repeated links are kept; the match is returned verbatim.
pub fn extract_urls(input: &str) -> Vec<String> {
    URL_RE
        .find_iter(input)
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// Stable identifier for a message that can be logged without leaking its content.
pub fn message_digest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_owned()
}
