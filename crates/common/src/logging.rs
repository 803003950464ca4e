use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global stderr subscriber. Later calls are no-ops, which keeps tests that
/// share a process from panicking on double initialisation.
pub fn init_logging(service: &str, default_level: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(service, "logging initialised");
    }
}
