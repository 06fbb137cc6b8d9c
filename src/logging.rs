/// Install a `tracing` subscriber writing to stderr.
///
/// Filter comes from `RUST_LOG`, `info` if unset. Under Lambda, CloudWatch
/// stamps each line, so timestamps and colors are left out.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let on_lambda = std::env::var_os("AWS_LAMBDA_FUNCTION_NAME").is_some();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!on_lambda)
        .with_target(false);

    // try_init fails only when a subscriber is already set, e.g. in tests
    let _ = if on_lambda {
        builder.without_time().try_init()
    } else {
        builder.try_init()
    };
}
