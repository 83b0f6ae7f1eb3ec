//! Lead qualification and outreach drafting backed by the language model.
//!
//! Both entry points are fail-soft: `qualify_lead` always yields a score in
//! [0, 100] and `generate_message` always yields text. Failures are logged and
//! replaced with a neutral value so storage never receives garbage.

use crate::errors::AppError;
use crate::llm_client::TextCompletionProvider;
use crate::models::{Lead, ScoreWeights};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Stored and evaluated in place of a message when generation fails.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate message.";

/// Single-line lead summary sent as the user message. Budget keeps its decimal point.
pub fn build_lead_context(lead: &Lead) -> String {
    format!(
        "Name: {}, Company: {}, Industry: {}, Budget: {:?}, Needs: {}",
        lead.name, lead.company, lead.industry, lead.budget, lead.needs
    )
}

/// Checks the fields that identify a lead and its budget.
///
/// Mirrors `CreateLeadRequest::validate`. Blank industry or needs text is
/// still sent to the model, which judges vague input itself.
pub fn validate_lead(lead: &Lead) -> Result<(), AppError> {
    let mut missing = Vec::new();
    if lead.name.trim().is_empty() {
        missing.push("name");
    }
    if lead.company.trim().is_empty() {
        missing.push("company");
    }
    if !lead.budget.is_finite() || lead.budget < 0.0 {
        missing.push("budget");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Missing required lead fields: {:?}",
            missing
        )))
    }
}

/// Parses the model's reply as one floating-point number.
pub fn parse_score(raw: &str) -> Result<f64, AppError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(AppError::Format("Model response content is empty".to_string()));
    }

    match content.parse::<f64>() {
        Ok(score) if !score.is_nan() => Ok(score),
        _ => Err(AppError::Format(format!(
            "Model returned non-numeric score: '{}'",
            content
        ))),
    }
}

pub fn clamp_score(score: f64) -> f64 {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Strict variant of [`qualify_lead`]: every failure is returned.
pub async fn try_qualify_lead(
    provider: &dyn TextCompletionProvider,
    lead: &Lead,
    policy: &str,
    weights: Option<&ScoreWeights>,
) -> Result<f64, AppError> {
    validate_lead(lead)?;

    let mut context = build_lead_context(lead);
    if let Some(weights) = weights.filter(|w| !w.is_empty()) {
        let rendered = serde_json::to_string(weights)
            .map_err(|e| AppError::InternalError(format!("Failed to render weights: {}", e)))?;
        context.push_str("\nCustom weights: ");
        context.push_str(&rendered);
    }

    let raw = provider.score(&context, policy).await?;
    let score = parse_score(&raw)?;

    Ok(clamp_score(score))
}

/// Qualification score for `lead` in [0, 100]. Returns 0 on any failure.
pub async fn qualify_lead(
    provider: &dyn TextCompletionProvider,
    lead: &Lead,
    policy: &str,
    weights: Option<&ScoreWeights>,
) -> f64 {
    match try_qualify_lead(provider, lead, policy, weights).await {
        Ok(score) => {
            tracing::info!("Lead {} qualified with score {}", lead.id, score);
            score
        }
        Err(e) => {
            tracing::warn!("[qualify_lead] lead {}: {}", lead.id, e);
            MIN_SCORE
        }
    }
}

/// Drafts an outreach message for `lead`. Returns the placeholder on failure.
pub async fn generate_message(
    provider: &dyn TextCompletionProvider,
    lead: &Lead,
    policy: &str,
) -> String {
    let context = build_lead_context(lead);
    match provider.generate(&context, policy).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            tracing::warn!("[generate_message] lead {}: empty response", lead.id);
            GENERATION_FAILED_MESSAGE.to_string()
        }
        Err(e) => {
            tracing::warn!("[generate_message] lead {}: {}", lead.id, e);
            GENERATION_FAILED_MESSAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubProvider {
        reply: Result<String, AppError>,
        seen_context: Mutex<Option<String>>,
    }

    impl StubProvider {
        fn replying(reply: Result<&str, AppError>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                seen_context: Mutex::new(None),
            }
        }

        fn seen(&self) -> Option<String> {
            self.seen_context.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextCompletionProvider for StubProvider {
        async fn score(&self, context: &str, _policy: &str) -> Result<String, AppError> {
            *self.seen_context.lock().unwrap() = Some(context.to_string());
            self.reply.clone()
        }

        async fn generate(&self, context: &str, _policy: &str) -> Result<String, AppError> {
            *self.seen_context.lock().unwrap() = Some(context.to_string());
            self.reply.clone()
        }
    }

    fn lead() -> Lead {
        Lead {
            id: 7,
            name: "Jane".to_string(),
            company: "Acme".to_string(),
            industry: "tech".to_string(),
            budget: 120_000.0,
            needs: "automation".to_string(),
            score: 0.0,
            stage: Stage::PotentialLead,
            last_message: None,
            interaction_log: None,
        }
    }

    #[test]
    fn test_parse_score_accepts_padded_numbers() {
        assert_eq!(parse_score(" 85 \n").unwrap(), 85.0);
        assert_eq!(parse_score("72.5").unwrap(), 72.5);
        assert_eq!(parse_score("-3").unwrap(), -3.0);
    }

    #[test]
    fn test_parse_score_rejects_garbage() {
        assert!(matches!(parse_score(""), Err(AppError::Format(_))));
        assert!(matches!(parse_score("   "), Err(AppError::Format(_))));
        assert!(matches!(parse_score("Score: 80"), Err(AppError::Format(_))));
        assert!(matches!(parse_score("NaN"), Err(AppError::Format(_))));
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(150.0), 100.0);
        assert_eq!(clamp_score(-20.0), 0.0);
        assert_eq!(clamp_score(f64::INFINITY), 100.0);
        assert_eq!(clamp_score(42.0), 42.0);
    }

    #[test]
    fn test_context_format() {
        assert_eq!(
            build_lead_context(&lead()),
            "Name: Jane, Company: Acme, Industry: tech, Budget: 120000.0, Needs: automation"
        );
    }

    #[tokio::test]
    async fn test_qualify_lead_clamps_reply() {
        let provider = StubProvider::replying(Ok("140"));
        assert_eq!(qualify_lead(&provider, &lead(), "policy", None).await, 100.0);
    }

    #[tokio::test]
    async fn test_qualify_lead_degrades_to_zero() {
        let failing = StubProvider::replying(Err(AppError::ExternalApiError("timeout".into())));
        assert_eq!(qualify_lead(&failing, &lead(), "policy", None).await, 0.0);

        let empty = StubProvider::replying(Ok(""));
        assert_eq!(qualify_lead(&empty, &lead(), "policy", None).await, 0.0);

        let wordy = StubProvider::replying(Ok("I would rate this lead highly"));
        assert_eq!(qualify_lead(&wordy, &lead(), "policy", None).await, 0.0);
    }

    #[tokio::test]
    async fn test_validation_happens_before_delegation() {
        let provider = StubProvider::replying(Ok("90"));
        let mut incomplete = lead();
        incomplete.company = "  ".to_string();

        let err = try_qualify_lead(&provider, &incomplete, "policy", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(provider.seen().is_none());
        assert_eq!(qualify_lead(&provider, &incomplete, "policy", None).await, 0.0);
    }

    #[tokio::test]
    async fn test_blank_industry_and_needs_still_reach_the_model() {
        let provider = StubProvider::replying(Ok("35"));
        let mut vague = lead();
        vague.industry = String::new();
        vague.needs = " ".to_string();

        assert_eq!(qualify_lead(&provider, &vague, "policy", None).await, 35.0);
        assert_eq!(
            provider.seen().unwrap(),
            "Name: Jane, Company: Acme, Industry: , Budget: 120000.0, Needs:  "
        );
    }

    #[tokio::test]
    async fn test_negative_budget_fails_validation() {
        let provider = StubProvider::replying(Ok("90"));
        let mut broke = lead();
        broke.budget = -1.0;

        assert!(matches!(
            try_qualify_lead(&provider, &broke, "policy", None).await,
            Err(AppError::Validation(_))
        ));
        assert!(provider.seen().is_none());
    }

    #[tokio::test]
    async fn test_weights_appended_to_context() {
        let provider = StubProvider::replying(Ok("60"));
        let mut weights = ScoreWeights::new();
        weights.insert("budget".to_string(), serde_json::json!(0.7));

        qualify_lead(&provider, &lead(), "policy", Some(&weights)).await;
        let context = provider.seen().unwrap();
        assert!(context.ends_with("\nCustom weights: {\"budget\":0.7}"));
    }

    #[tokio::test]
    async fn test_empty_weights_not_appended() {
        let provider = StubProvider::replying(Ok("60"));
        qualify_lead(&provider, &lead(), "policy", Some(&ScoreWeights::new())).await;
        assert!(!provider.seen().unwrap().contains("Custom weights"));
    }

    #[tokio::test]
    async fn test_generate_message_falls_back_to_placeholder() {
        let failing = StubProvider::replying(Err(AppError::ExternalApiError("down".into())));
        assert_eq!(
            generate_message(&failing, &lead(), "policy").await,
            GENERATION_FAILED_MESSAGE
        );

        let ok = StubProvider::replying(Ok("  Hello Jane  "));
        assert_eq!(generate_message(&ok, &lead(), "policy").await, "Hello Jane");
    }
}
