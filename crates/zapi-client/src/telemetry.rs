//! Tracing initialisation for binaries built on zapi-client.
//!
//! Logs go to stderr so that stdout stays free for resolved IDs and job
//! tokens that scripts capture. Only the first call takes effect.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset: our crates at `level`, HTTP
/// internals (hyper, reqwest connection pool) at warn.
fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::new(format!(
        "warn,zapi_client={level},zapi={level}",
        level = level.as_str().to_lowercase()
    ))
}

/// Initialise the global tracing subscriber.
///
/// * `json`: emit newline-delimited JSON instead of human-readable lines.
/// * `level`: verbosity for zapi crates when `RUST_LOG` is not set.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_mentions_crates() {
        let rendered = default_filter(Level::DEBUG).to_string().to_lowercase();
        assert!(rendered.contains("zapi_client=debug"));
        assert!(rendered.contains("zapi=debug"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
    }
}
