use microsearch_core::config::parse_bool;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive when `RUST_LOG` is unset.
pub fn default_directive(verbose: Option<&str>) -> &'static str {
    match verbose.map(str::trim).and_then(parse_bool) {
        Some(true) => "debug",
        _ => "info",
    }
}

/// Installs the fmt subscriber used by the binaries. `RUST_LOG` wins;
/// otherwise `VERBOSE` picks between `info` and `debug`.
pub fn init_tracing() {
    let verbose = std::env::var("VERBOSE").ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose.as_deref())));
    fmt().with_env_filter(filter).init();
}
