//! Flattens `build_logs.json` into a CSV next to it.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tournament_ops::config::Config;
use tournament_ops::export;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env();

    let output = config.build_logs.with_extension("csv");
    let rows = export::run(&config.build_logs, &output)
        .with_context(|| format!("exporting {}", config.build_logs.display()))?;
    tracing::info!(rows, output = %output.display(), "export complete");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tournament_ops=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
