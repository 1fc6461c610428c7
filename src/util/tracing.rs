use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub type Result<T> = core::result::Result<T, TryInitError>;

pub const DEFAULT_FILTER: &str = "helix_eventsub=debug,reqwest=info,info";

/// Installs a global `fmt` subscriber.
///
/// The filter is taken from `RUST_LOG` when set, falling back to [`DEFAULT_FILTER`]. Fails if a
/// global subscriber has already been installed.
pub fn build_subscriber() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .try_init()
}
