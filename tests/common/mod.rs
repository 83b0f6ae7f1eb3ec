#![allow(dead_code)]

use async_trait::async_trait;
use rust_lead_crm::db::Database;
use rust_lead_crm::errors::AppError;
use rust_lead_crm::lead_storage::LeadStorage;
use rust_lead_crm::llm_client::TextCompletionProvider;
use rust_lead_crm::models::NewLead;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic provider: fixed replies, counts calls.
pub struct StubProvider {
    pub score_reply: Result<String, AppError>,
    pub generate_reply: Result<String, AppError>,
    pub calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(score_reply: Result<&str, AppError>, generate_reply: Result<&str, AppError>) -> Self {
        Self {
            score_reply: score_reply.map(str::to_string),
            generate_reply: generate_reply.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn scoring(reply: &str) -> Self {
        Self::new(Ok(reply), Ok(""))
    }

    pub fn failing() -> Self {
        Self::new(
            Err(AppError::ExternalApiError("model unavailable".to_string())),
            Err(AppError::ExternalApiError("model unavailable".to_string())),
        )
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextCompletionProvider for StubProvider {
    async fn score(&self, _context: &str, _policy: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.score_reply.clone()
    }

    async fn generate(&self, _context: &str, _policy: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.generate_reply.clone()
    }
}

pub async fn memory_storage() -> LeadStorage {
    let db = Database::in_memory()
        .await
        .expect("in-memory database should open");
    LeadStorage::new(db.pool.clone())
}

pub fn new_lead(name: &str, company: &str) -> NewLead {
    NewLead {
        name: name.to_string(),
        company: company.to_string(),
        industry: "tech".to_string(),
        budget: 120_000.0,
        needs: "automation".to_string(),
    }
}

/// A 62-word outreach message that passes every checklist item for Jane at Acme.
pub fn perfect_message() -> String {
    let filler = vec!["value"; 50].join(" ");
    format!(
        "Hi Jane, at Acme we noticed your need for automation. {} professional regards",
        filler
    )
}
