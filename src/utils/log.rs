use env_logger::{Builder, Env};

/// Sets up `env_logger` as the global logger.
///
/// Logs at `info` by default, which includes the per-alert delivery summary. Set `RUST_LOG` to
/// override, eg. `RUST_LOG=debug` to see how destinations were resolved.
pub fn bootstrap_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init()
}
