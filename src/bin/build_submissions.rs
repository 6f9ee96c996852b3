//! Submits every `repos.csv` row to the build service and writes
//! `build_logs.json`. Not resumable: every invocation rebuilds all rows.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tournament_ops::build;
use tournament_ops::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env();

    let records = build::run(&config).await.context("running build pass")?;
    let built = records.iter().filter(|r| r.image_id.is_some()).count();
    tracing::info!(
        total = records.len(),
        built,
        path = %config.build_logs.display(),
        "wrote build logs"
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
