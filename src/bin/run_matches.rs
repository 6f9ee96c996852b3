//! Plays every pending pair of built images against the match service,
//! appending results to `match_results.json`. Safe to rerun after a
//! crash: completed pairs are skipped.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tournament_ops::config::Config;
use tournament_ops::matches;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env();

    let played = matches::run(&config).await.context("running match pass")?;
    tracing::info!(
        played,
        path = %config.match_results.display(),
        "match pass complete"
    );
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
