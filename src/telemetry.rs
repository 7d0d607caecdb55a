//! Logging setup for smoke test runs
//!
//! Plain tracing to stderr. The helpers emit spans around every kubectl
//! and Route53 call, so `RUST_LOG=ingress_dns_smoke=debug` shows the full
//! call sequence of a cleanup.
//!
//! # Example
//!
//! ```no_run
//! use ingress_dns_smoke::telemetry::init_logging;
//!
//! init_logging();
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize logging with tracing-subscriber
///
/// Uses RUST_LOG env var for filtering (default: info).
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
