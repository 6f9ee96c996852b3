//! Discovers tournament entries and writes `repos.csv`.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tournament_ops::config::Config;
use tournament_ops::github::{discovery, GitHubClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env();

    let client = GitHubClient::from_config(&config).context("constructing GitHub client")?;
    let entries = discovery::discover(&client, &config)
        .await
        .context("discovering tournament repositories")?;
    discovery::write_repos_csv(&config.repos_csv, &entries)
        .with_context(|| format!("writing {}", config.repos_csv.display()))?;

    tracing::info!(
        entries = entries.len(),
        path = %config.repos_csv.display(),
        "wrote discovered repositories"
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
