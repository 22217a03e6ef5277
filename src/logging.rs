use tracing_subscriber::EnvFilter;

/// Initialise logging to stderr. With `debug` the level is `debug` unless `RUST_LOG`
/// says otherwise; without it the level is fixed at `info`.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
