// Logging setup shared by the binaries

use tracing_subscriber::{fmt, prelude::*, registry::Registry, EnvFilter};

/// Install a stderr fmt subscriber filtered by RUST_LOG (default "info").
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing::subscriber::set_global_default(
        Registry::default()
            .with(filter)
            .with(fmt::Layer::default().with_writer(std::io::stderr).with_target(false)),
    );
}
