use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Install the process-wide tracing subscriber.
///
/// `env_filter` uses `EnvFilter` directive syntax (`info`, `kr_core=debug,warn`, ...).  Logs are
/// written to stderr; stdout is reserved for rendered output.
pub fn setup(env_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_span_events(FmtSpan::NONE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
