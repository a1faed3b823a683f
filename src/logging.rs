//! Logging init: structured logs to stderr, filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,drive_fetch=info";
const VERBOSE_FILTER: &str = "info,drive_fetch=debug";

/// Initialize logging to stderr. `RUST_LOG` wins over `verbose` when set.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
