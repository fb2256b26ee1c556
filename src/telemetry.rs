use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Registry with an env-filtered fmt layer. Binaries call this once at
/// startup; calling it again (e.g. from several tests) is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
