//! Log output for doclint.
//!
//! Reports own stdout (`doclint check --format json` is piped into other
//! tools), so every log line goes to stderr. Probe runs pull in the HTTP
//! client stack, whose connection chatter stays at `warn` unless `RUST_LOG`
//! asks for it.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose logs are capped at `warn` by default.
const QUIET_CRATES: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls"];

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(level: Level) -> String {
    let mut directive = level.as_str().to_ascii_lowercase();
    for krate in QUIET_CRATES {
        directive.push_str(&format!(",{}=warn", krate));
    }
    directive
}

/// Install the global subscriber: `--json-logs` selects newline-delimited
/// JSON, `--verbose` selects `DEBUG` as `level`.
///
/// Only the first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
