use std::net::SocketAddr;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "S2 DocGen";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version tag attached to generation metadata. Bump when prompts change.
pub const PROMPT_VERSION: &str = "1.0";

/// Environment variable holding the completion API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the completion API base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
/// Environment variable overriding the HTTP listen address.
pub const BIND_ENV: &str = "S2_DOCGEN_BIND";
/// Environment variable overriding the per-attempt HTTP timeout (seconds).
pub const HTTP_TIMEOUT_ENV: &str = "S2_DOCGEN_HTTP_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "s2_docgen=info,tower_http=info"
}

/// Runtime settings resolved once at startup.
///
/// Request handlers never read the environment; they receive these values
/// through the API context so behaviour stays consistent across threads.
#[derive(Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub base_url: String,
    pub http_timeout: Duration,
    /// Raw credential as found in the environment. Validated per request.
    pub api_key: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary lookup (env, test map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup(BIND_ENV)
            .and_then(|raw| match raw.parse::<SocketAddr>() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Invalid bind address, using default");
                    None
                }
            })
            .unwrap_or_else(default_bind_addr);

        let base_url = lookup(BASE_URL_ENV)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http_timeout = lookup(HTTP_TIMEOUT_ENV)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

        let api_key = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty());

        Self {
            bind_addr,
            base_url,
            http_timeout,
            api_key,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("bind_addr", &self.bind_addr)
            .field("base_url", &self.base_url)
            .field("http_timeout", &self.http_timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_empty() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.bind_addr.to_string(), DEFAULT_BIND);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.http_timeout, Duration::from_secs(120));
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let settings = Settings::from_lookup(lookup_from(&[
            (BIND_ENV, "0.0.0.0:8080"),
            (BASE_URL_ENV, "http://localhost:9999/"),
            (HTTP_TIMEOUT_ENV, "30"),
            (API_KEY_ENV, "sk-test"),
        ]));
        assert_eq!(settings.bind_addr.port(), 8080);
        assert_eq!(settings.base_url, "http://localhost:9999");
        assert_eq!(settings.http_timeout, Duration::from_secs(30));
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[
            (BIND_ENV, "not-an-address"),
            (HTTP_TIMEOUT_ENV, "0"),
            (API_KEY_ENV, "   "),
        ]));
        assert_eq!(settings.bind_addr.to_string(), DEFAULT_BIND);
        assert_eq!(settings.http_timeout, Duration::from_secs(120));
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn debug_output_redacts_key() {
        let settings = Settings::from_lookup(lookup_from(&[(API_KEY_ENV, "sk-secret-value")]));
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("sk-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn app_name_is_set() {
        assert_eq!(APP_NAME, "S2 DocGen");
    }
}
