//! Re-scores every stored lead against the current qualification policy.
//!
//! Optional weight overrides are read as a JSON object from `RESCORE_WEIGHTS`.

use rust_lead_crm::config::Config;
use rust_lead_crm::core::{models::ScoreWeights, services::LeadService};
use rust_lead_crm::data::{db::Database, lead_storage::LeadStorage};
use rust_lead_crm::integrations::llm_client::XaiClient;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url).await?;

    let weights: Option<ScoreWeights> = match std::env::var("RESCORE_WEIGHTS") {
        Ok(raw) if !raw.trim().is_empty() => Some(
            serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("RESCORE_WEIGHTS must be a JSON object: {}", e))?,
        ),
        _ => None,
    };

    let service = LeadService::new(
        LeadStorage::new(db.pool.clone()),
        Arc::new(XaiClient::from_config(&config)?),
    );

    tracing::info!(
        "Connected to database. Re-scoring leads (custom weights: {})...",
        weights.is_some()
    );

    let results = service.rescore_all(weights.as_ref()).await?;
    for scored in &results {
        tracing::info!("Lead {} -> {}", scored.id, scored.score);
    }

    let zeroed = results.iter().filter(|r| r.score == 0.0).count();
    tracing::info!(
        "Re-scoring complete. {} leads updated, {} at score 0.",
        results.len(),
        zeroed
    );

    Ok(())
}
