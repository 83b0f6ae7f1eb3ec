use crate::errors::{AppError, ResultExt};
use crate::evaluation::evaluate_response;
use crate::lead_storage::LeadStorage;
use crate::llm_client::TextCompletionProvider;
use crate::models::*;
use crate::pipeline;
use crate::prompts::{MESSAGE_PROMPT, QUALIFICATION_PROMPT};
use crate::scoring::{generate_message, qualify_lead};
use std::sync::Arc;

/// Lead workflows: create-and-score, interactions, re-scoring and outreach.
///
/// Built per request from the shared storage handle and the injected provider.
pub struct LeadService {
    storage: LeadStorage,
    provider: Arc<dyn TextCompletionProvider>,
}

impl LeadService {
    pub fn new(storage: LeadStorage, provider: Arc<dyn TextCompletionProvider>) -> Self {
        Self { storage, provider }
    }

    /// Persist a lead, score it, and store the score before returning.
    pub async fn create_lead(&self, request: CreateLeadRequest) -> Result<LeadScoreResponse, AppError> {
        request.validate()?;

        let new_lead = NewLead::from(request);
        let id = self.storage.create_lead(&new_lead).await?;

        let lead = self
            .storage
            .get_lead(id)
            .await?
            .ok_or_else(|| AppError::InternalError(format!("Lead {} vanished after insert", id)))?;

        let score = qualify_lead(self.provider.as_ref(), &lead, QUALIFICATION_PROMPT, None).await;
        self.storage
            .set_score(id, score)
            .await
            .with_context(|| format!("storing initial score for lead {}", id))?;

        Ok(LeadScoreResponse { id, score })
    }

    /// Record an interaction; the lead's stage follows its direction.
    pub async fn record_interaction(
        &self,
        lead_id: i64,
        request: &InteractionRequest,
    ) -> Result<i64, AppError> {
        let (direction, stage) = pipeline::transition_for(&request.direction)?;
        tracing::debug!(
            "Lead {} interaction {} -> stage {}",
            lead_id,
            direction,
            stage
        );

        self.storage
            .record_interaction(
                lead_id,
                &request.message,
                direction,
                request.timestamp.as_ref(),
            )
            .await
            .with_context(|| format!("recording interaction for lead {}", lead_id))
    }

    /// Re-score an existing lead with optional weight overrides.
    pub async fn rescore_lead(
        &self,
        lead_id: i64,
        weights: Option<&ScoreWeights>,
    ) -> Result<LeadScoreResponse, AppError> {
        let lead = self.require_lead(lead_id).await?;

        let score = qualify_lead(self.provider.as_ref(), &lead, QUALIFICATION_PROMPT, weights).await;
        self.storage.set_score(lead_id, score).await?;

        Ok(LeadScoreResponse { id: lead_id, score })
    }

    /// Re-score every stored lead. Scores are written one lead at a time.
    pub async fn rescore_all(
        &self,
        weights: Option<&ScoreWeights>,
    ) -> Result<Vec<LeadScoreResponse>, AppError> {
        let leads = self.storage.get_leads(None).await?;
        let mut results = Vec::with_capacity(leads.len());

        for lead in leads {
            let score =
                qualify_lead(self.provider.as_ref(), &lead, QUALIFICATION_PROMPT, weights).await;
            self.storage.set_score(lead.id, score).await?;
            results.push(LeadScoreResponse { id: lead.id, score });
        }

        Ok(results)
    }

    /// All leads, or the matches for a non-blank search query.
    pub async fn list_leads(&self, search: Option<&str>) -> Result<Vec<Lead>, AppError> {
        match search.filter(|q| !q.is_empty()) {
            Some(query) => self.storage.search_leads(query).await,
            None => self.storage.get_leads(None).await,
        }
    }

    /// Draft an outreach message, evaluate it and keep it on the lead.
    ///
    /// Generation failures yield the placeholder text, which is still evaluated
    /// and stored.
    pub async fn generate_outreach(&self, lead_id: i64) -> Result<GeneratedMessageResponse, AppError> {
        let lead = self.require_lead(lead_id).await?;

        let message = generate_message(self.provider.as_ref(), &lead, MESSAGE_PROMPT).await;
        let evaluation = evaluate_response(&message, &lead);

        tracing::info!(
            "Outreach for lead {} scored {} ({} recommendations)",
            lead_id,
            evaluation.score,
            evaluation.recommendations.len()
        );

        let update = LeadUpdate {
            last_message: Some(message.clone()),
            interaction_log: Some(format!("Generated message: {}", message)),
            ..Default::default()
        };
        self.storage
            .update_lead(lead_id, &update)
            .await
            .context("storing generated message")?;

        Ok(GeneratedMessageResponse {
            message,
            evaluation,
        })
    }

    pub async fn get_lead(&self, lead_id: i64) -> Result<Lead, AppError> {
        self.require_lead(lead_id).await
    }

    pub async fn list_interactions(&self, lead_id: i64) -> Result<Vec<Interaction>, AppError> {
        self.require_lead(lead_id).await?;
        self.storage.list_interactions(lead_id).await
    }

    pub async fn delete_lead(&self, lead_id: i64) -> Result<(), AppError> {
        match self.storage.delete_lead(lead_id).await? {
            0 => Err(AppError::NotFound(format!("Lead with id {} not found", lead_id))),
            _ => Ok(()),
        }
    }

    async fn require_lead(&self, lead_id: i64) -> Result<Lead, AppError> {
        self.storage
            .get_lead(lead_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lead with id {} not found", lead_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use async_trait::async_trait;

    struct FixedScore(&'static str);

    #[async_trait]
    impl TextCompletionProvider for FixedScore {
        async fn score(&self, _context: &str, _policy: &str) -> Result<String, AppError> {
            Ok(self.0.to_string())
        }

        async fn generate(&self, _context: &str, _policy: &str) -> Result<String, AppError> {
            Err(AppError::ExternalApiError("not used".to_string()))
        }
    }

    async fn service(reply: &'static str) -> LeadService {
        let db = Database::in_memory().await.unwrap();
        LeadService::new(LeadStorage::new(db.pool.clone()), Arc::new(FixedScore(reply)))
    }

    fn request(name: &str) -> CreateLeadRequest {
        CreateLeadRequest {
            name: name.to_string(),
            company: "Acme".to_string(),
            industry: "finance".to_string(),
            budget: 75_000.0,
            needs: "reporting".to_string(),
        }
    }

    #[tokio::test]
    async fn test_rescore_all_updates_every_lead() {
        let service = service("55").await;
        service.create_lead(request("Jane")).await.unwrap();
        service.create_lead(request("Bob")).await.unwrap();

        let results = service.rescore_all(None).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.score == 55.0));
        for lead in service.list_leads(None).await.unwrap() {
            assert_eq!(lead.score, 55.0);
        }
    }

    #[tokio::test]
    async fn test_invalid_direction_is_rejected_before_any_write() {
        let service = service("55").await;
        let created = service.create_lead(request("Jane")).await.unwrap();

        let err = service
            .record_interaction(
                created.id,
                &InteractionRequest {
                    message: "hello".to_string(),
                    direction: "sideways".to_string(),
                    timestamp: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidDirection(_)));
        let lead = service.get_lead(created.id).await.unwrap();
        assert_eq!(lead.stage, Stage::PotentialLead);
        assert!(service.list_interactions(created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_search_lists_everything() {
        let service = service("10").await;
        service.create_lead(request("Jane")).await.unwrap();

        assert_eq!(service.list_leads(Some("")).await.unwrap().len(), 1);
        assert!(service.list_leads(Some("nomatch")).await.unwrap().is_empty());
    }
}
