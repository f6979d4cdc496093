use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use zeroize::Zeroizing;

/// Provider secret keys start with `sk-` and contain no whitespace.
static SECRET_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sk-\S+$").expect("valid regex"));

/// Completion API bearer token. Wiped from memory on drop, never printed.
#[derive(Clone)]
pub struct ApiCredential(Zeroizing<String>);

impl ApiCredential {
    /// Accept a raw key only if it has the provider's secret-key shape.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        SECRET_KEY_PATTERN
            .is_match(trimmed)
            .then(|| Self(Zeroizing::new(trimmed.to_string())))
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(sk-***)")
    }
}
