use crate::config::Config;
use crate::errors::AppError;
use crate::lead_storage::LeadStorage;
use crate::llm_client::TextCompletionProvider;
use crate::models::*;
use crate::services::LeadService;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Lead and interaction store.
    pub storage: LeadStorage,
    /// Language model used for scoring and outreach drafting.
    pub provider: Arc<dyn TextCompletionProvider>,
}

impl AppState {
    fn lead_service(&self) -> LeadService {
        LeadService::new(self.storage.clone(), self.provider.clone())
    }
}

/// Health check endpoint. Reports the configured scoring model.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "model": state.config.xai_model
        })),
    )
}

/// POST /leads
///
/// Stores a new lead and scores it before responding.
///
/// # Returns
///
/// * `Result<Json<LeadScoreResponse>, AppError>` - The new id and its initial score.
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateLeadRequest>,
) -> Result<Json<LeadScoreResponse>, AppError> {
    tracing::info!("POST /leads - {} at {}", payload.name, payload.company);

    let created = state.lead_service().create_lead(payload).await?;

    tracing::info!("Lead {} created with score {}", created.id, created.score);
    Ok(Json(created))
}

/// GET /leads
///
/// Lists all leads, or searches company, needs and interaction log when
/// `search` is given.
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeadSearchParams>,
) -> Result<Json<Vec<Lead>>, AppError> {
    tracing::info!("GET /leads - search: {:?}", params.search);

    let leads = state
        .lead_service()
        .list_leads(params.search.as_deref())
        .await?;
    Ok(Json(leads))
}

/// GET /leads/:id
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<i64>,
) -> Result<Json<Lead>, AppError> {
    tracing::info!("GET /leads/{}", lead_id);

    let lead = state.lead_service().get_lead(lead_id).await?;
    Ok(Json(lead))
}

/// DELETE /leads/:id
///
/// Removes the lead together with its interactions.
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    tracing::info!("DELETE /leads/{}", lead_id);

    state.lead_service().delete_lead(lead_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /leads/:id/interactions
pub async fn list_interactions(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<i64>,
) -> Result<Json<Vec<Interaction>>, AppError> {
    tracing::info!("GET /leads/{}/interactions", lead_id);

    let interactions = state.lead_service().list_interactions(lead_id).await?;
    Ok(Json(interactions))
}

/// POST /add_interaction/:id
///
/// Records an inbound or outbound message. The lead's stage follows the
/// direction of this latest interaction.
pub async fn add_interaction(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<i64>,
    Json(payload): Json<InteractionRequest>,
) -> Result<Json<InteractionResponse>, AppError> {
    tracing::info!(
        "POST /add_interaction/{} - direction: {}",
        lead_id,
        payload.direction
    );

    let id = state
        .lead_service()
        .record_interaction(lead_id, &payload)
        .await?;

    Ok(Json(InteractionResponse {
        status: "success".to_string(),
        id,
    }))
}

/// POST /leads/:id/score
///
/// Re-scores a lead, optionally with custom weights. The body may be omitted,
/// but a body that is present must be a valid `RescoreRequest`.
pub async fn rescore_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<i64>,
    body: Bytes,
) -> Result<Json<LeadScoreResponse>, AppError> {
    let request = RescoreRequest::from_body(&body)?;
    tracing::info!(
        "POST /leads/{}/score - custom weights: {}",
        lead_id,
        request.weights.is_some()
    );

    let scored = state
        .lead_service()
        .rescore_lead(lead_id, request.weights.as_ref())
        .await?;
    Ok(Json(scored))
}

/// POST /leads/:id/message
///
/// Drafts an outreach message, evaluates it against the checklist and stores
/// it as the lead's last message.
pub async fn generate_message(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<i64>,
) -> Result<Json<GeneratedMessageResponse>, AppError> {
    tracing::info!("POST /leads/{}/message", lead_id);

    let generated = state.lead_service().generate_outreach(lead_id).await?;
    Ok(Json(generated))
}
