//! Diagnostic logging.
//!
//! Logs go to stderr so stdout only ever carries the JSON response.
//! `RUST_LOG` takes precedence over the configured level:
//!
//! ```bash
//! RUST_LOG=phpcursor=debug phpcursor invocation --file a.php --offset 42
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` if set and valid, else the configured
/// level, else `warn`.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global stderr subscriber.
///
/// Safe to call more than once; only the first call takes effect.
pub fn init(config: &LoggingConfig) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(config))
        .with_ansi(false)
        .with_target(true)
        .try_init();
}
