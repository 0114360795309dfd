use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "ruleboard=info,ruleboard_core=info,ruleboard_relay=info,tower_http=info";

/// Install the global subscriber. `RUST_LOG` overrides the default filter. Output goes
/// to stderr so CLI answers on stdout stay clean.
pub fn init(json: bool) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
