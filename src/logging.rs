//! Process-wide tracing setup.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! application's call. [`init_logging`] is a convenience for binaries and
//! tests.

use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "NLUI_LOG";
const DEFAULT_FILTER: &str = "info";

static INIT: OnceCell<()> = OnceCell::new();

/// `NLUI_LOG` wins over `RUST_LOG`; an unparsable value falls through.
fn resolve_env_filter() -> EnvFilter {
    if let Ok(directives) = std::env::var(ENV_LOG) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a compact stderr subscriber once per process.
///
/// Safe to call repeatedly. If another subscriber is already installed it
/// is left alone.
pub fn init_logging() {
    INIT.get_or_init(|| {
        let layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr);
        let _ = tracing_subscriber::registry()
            .with(resolve_env_filter())
            .with(layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_nlui_log_takes_precedence() {
        std::env::set_var(ENV_LOG, "nlui_client=trace");
        std::env::set_var("RUST_LOG", "warn");
        let filter = resolve_env_filter();
        assert_eq!(filter.to_string(), "nlui_client=trace");
        std::env::remove_var(ENV_LOG);
        std::env::remove_var("RUST_LOG");
    }

    #[test]
    #[serial]
    fn test_falls_back_to_default() {
        std::env::remove_var(ENV_LOG);
        std::env::remove_var("RUST_LOG");
        assert_eq!(resolve_env_filter().to_string(), "info");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_logging();
        init_logging();
    }
}
