//! Connection configuration
//!
//! Settings come from environment variables or from a `key=value` file in
//! the format of the classic `jira.properties`:
//!
//! ```text
//! url=https://jira.example.com/
//! user=ci-bot
//! pass=secret
//! authKey=
//! projectName=DEMO
//! ```
//!
//! A non-empty `authKey` wins over `user`/`pass`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::ZapiError;
use crate::Result;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Jira/ZAPI connection configuration
#[derive(Clone)]
pub struct ZapiConfig {
    /// Jira base URL (e.g., "https://jira.example.com")
    pub base_url: String,
    /// Base64-encoded `user:pass` used for Basic authentication
    pub auth_key: String,
    /// Project the client session is bound to
    pub project_name: String,
    /// Per-request timeout enforced by the transport
    pub timeout: Duration,
}

impl std::fmt::Debug for ZapiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZapiConfig")
            .field("base_url", &self.base_url)
            .field("auth_key", &"<redacted>")
            .field("project_name", &self.project_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Generate the Basic auth token for a user/password pair.
pub fn encode_auth_key(user: &str, pass: &str) -> String {
    BASE64.encode(format!("{}:{}", user, pass))
}

impl ZapiConfig {
    /// Create a new configuration with a precomputed auth key
    pub fn new(
        base_url: impl Into<String>,
        auth_key: impl Into<String>,
        project_name: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            auth_key: auth_key.into(),
            project_name: project_name.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create a configuration from a user/password pair
    pub fn with_credentials(
        base_url: impl Into<String>,
        user: &str,
        pass: &str,
        project_name: impl Into<String>,
    ) -> Self {
        Self::new(base_url, encode_auth_key(user, pass), project_name)
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set project name
    pub fn with_project(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = project_name.into();
        self
    }

    /// Create from environment variables
    ///
    /// A `.env` file in the working directory, if present, is loaded first.
    ///
    /// Reads:
    /// - JIRA_URL (required)
    /// - JIRA_AUTH_KEY, or JIRA_USER and JIRA_PASS (one of the two required)
    /// - JIRA_PROJECT (required)
    /// - JIRA_TIMEOUT_SECS (optional, default: 30)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let vars: HashMap<String, String> = [
            ("url", "JIRA_URL"),
            ("authKey", "JIRA_AUTH_KEY"),
            ("user", "JIRA_USER"),
            ("pass", "JIRA_PASS"),
            ("projectName", "JIRA_PROJECT"),
            ("timeoutSecs", "JIRA_TIMEOUT_SECS"),
        ]
        .into_iter()
        .filter_map(|(key, var)| std::env::var(var).ok().map(|v| (key.to_string(), v)))
        .collect();

        Self::from_properties(&vars, "environment")
    }

    /// Load from a `jira.properties` file
    ///
    /// Values are taken literally: `$` and `#` inside a value are kept as is.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ZapiError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_properties(&parse_properties(&text), &path.display().to_string())
    }

    fn from_properties(props: &HashMap<String, String>, origin: &str) -> Result<Self> {
        let get = |key: &str| {
            props
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let base_url = get("url")
            .ok_or_else(|| ZapiError::Config(format!("`url` is not set in {}", origin)))?;
        let project_name = get("projectName")
            .ok_or_else(|| ZapiError::Config(format!("`projectName` is not set in {}", origin)))?;

        let auth_key = match get("authKey") {
            Some(key) => key.to_string(),
            None => match (get("user"), get("pass")) {
                (Some(user), Some(pass)) => encode_auth_key(user, pass),
                _ => {
                    return Err(ZapiError::Config(format!(
                        "neither `authKey` nor `user`/`pass` are set in {}",
                        origin
                    )))
                }
            },
        };

        let timeout = match get("timeoutSecs") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    ZapiError::Config(format!("invalid timeout '{}' in {}", raw, origin))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            base_url: base_url.to_string(),
            auth_key,
            project_name: project_name.to_string(),
            timeout,
        })
    }
}

/// Parse `.properties` text.
///
/// Lines starting with `#` or `!` are comments. The key ends at the first
/// unescaped `=`, `:` or whitespace. A trailing backslash continues the value
/// on the next line. No variable substitution is done.
fn parse_properties(text: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let mut logical = line.trim_start().to_string();
        if logical.is_empty() || logical.starts_with('#') || logical.starts_with('!') {
            continue;
        }
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        props.insert(unescape(key), unescape(value));
    }

    props
}

/// Odd number of trailing backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..i], line[i + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[i..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (&line[..i], rest.trim_start());
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
