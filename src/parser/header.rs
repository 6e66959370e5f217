use std::sync::LazyLock;

use regex::Regex;

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Location:\s*(\S+)").unwrap());
static PAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Page:\s*(\S+)").unwrap());
static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(\w+)\s+highlight").unwrap());

/// Fields recovered from an annotation header such as
/// `Yellow highlight | Page: 56, Location: 1234`. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub color: String,
    pub page: String,
    pub location: String,
}

pub fn parse_header(raw: &str) -> HeaderFields {
    let raw = raw.trim();
    HeaderFields {
        color: COLOR_RE
            .captures(raw)
            .map(|c| c[1].to_string())
            .unwrap_or_default(),
        page: labelled_token(&PAGE_RE, raw),
        location: labelled_token(&LOCATION_RE, raw),
    }
}

fn labelled_token(re: &Regex, raw: &str) -> String {
    re.captures(raw)
        .map(|c| c[1].trim_end_matches(',').to_string())
        .unwrap_or_default()
}

// ── Tests ──
