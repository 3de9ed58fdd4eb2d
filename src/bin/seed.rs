use anyhow::Context;
use giftlink::{
    config::DatabaseConfig,
    gifts::services::{seed_if_empty, SeedFile, SeedOutcome},
    store::PgStore,
    telemetry,
};

/// Loads a `{"docs": [...]}` file into an empty gifts table.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("GIFTS_SEED_FILE").ok())
        .context("usage: seed <gifts.json> (or set GIFTS_SEED_FILE)")?;

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("read {path}"))?;
    let file: SeedFile =
        serde_json::from_str(&raw).with_context(|| format!("parse {path}"))?;

    let db = DatabaseConfig::from_env()?;
    let store = PgStore::connect(&db.url, 1).await?;
    store.migrate().await?;

    match seed_if_empty(&store, file.docs).await? {
        SeedOutcome::Inserted(n) => tracing::info!(inserted = n, file = %path, "seed complete"),
        SeedOutcome::AlreadyPopulated(n) => {
            tracing::info!(existing = n, "gifts already present; seed skipped")
        }
    }
    Ok(())
}
