//! Posts a build-status message to each submission repository's status
//! issue, pausing between posts to stay under abuse-rate limits.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tournament_ops::config::Config;
use tournament_ops::github::GitHubClient;
use tournament_ops::notify;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env();

    let client = GitHubClient::from_config(&config).context("constructing GitHub client")?;
    let posted = notify::run(&config, &client)
        .await
        .context("posting build-status notifications")?;
    tracing::info!(posted, "notification pass complete");
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
