use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

// ============ Enumerations ============

/// Pipeline position of a lead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    PotentialLead,
    ReachedOut,
    ResponseReceived,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::PotentialLead => "potential_lead",
            Stage::ReachedOut => "reached_out",
            Stage::ResponseReceived => "response_received",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side sent an interaction message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = AppError;

    /// Exact, case-sensitive match on the stored values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(Direction::Inbound),
            "outbound" => Ok(Direction::Outbound),
            other => Err(AppError::InvalidDirection(format!(
                "direction must be 'inbound' or 'outbound', got '{}'",
                other
            ))),
        }
    }
}

// ============ Database Models ============

/// A prospective customer tracked through the sales pipeline.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub company: String,
    pub industry: String,
    pub budget: f64,
    pub needs: String,
    /// Qualification score in [0, 100].
    pub score: f64,
    pub stage: Stage,
    pub last_message: Option<String>,
    pub interaction_log: Option<String>,
}

/// A single inbound or outbound message exchanged with a lead.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Interaction {
    pub id: i64,
    pub lead_id: i64,
    pub message: String,
    pub direction: Direction,
    /// Canonical `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

/// Fields required to insert a lead. Score and stage always start at their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub company: String,
    pub industry: String,
    pub budget: f64,
    pub needs: String,
}

/// Typed partial update. `None` leaves a column untouched.
///
/// Score and stage are deliberately absent: they belong to the scoring and
/// pipeline paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub budget: Option<f64>,
    pub needs: Option<String>,
    pub last_message: Option<String>,
    pub interaction_log: Option<String>,
}

impl LeadUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.company.is_none()
            && self.industry.is_none()
            && self.budget.is_none()
            && self.needs.is_none()
            && self.last_message.is_none()
            && self.interaction_log.is_none()
    }
}

/// Custom weight overrides forwarded verbatim to the scorer.
pub type ScoreWeights = serde_json::Map<String, serde_json::Value>;

// ============ API Request Models ============

/// Body of `POST /leads`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeadRequest {
    pub name: String,
    pub company: String,
    pub industry: String,
    pub budget: f64,
    pub needs: String,
}

impl CreateLeadRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".to_string()));
        }
        if self.company.trim().is_empty() {
            return Err(AppError::BadRequest("company is required".to_string()));
        }
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(AppError::BadRequest(
                "budget must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<CreateLeadRequest> for NewLead {
    fn from(req: CreateLeadRequest) -> Self {
        Self {
            name: req.name,
            company: req.company,
            industry: req.industry,
            budget: req.budget,
            needs: req.needs,
        }
    }
}

/// Body of `POST /add_interaction/:id`.
///
/// `direction` stays a string so an unknown value reaches the pipeline as
/// `InvalidDirection` instead of a deserialization failure. `timestamp` accepts
/// any JSON value; non-strings fall back to the current time.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionRequest {
    pub message: String,
    pub direction: String,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

/// Body of `POST /leads/:id/score`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RescoreRequest {
    #[serde(default)]
    pub weights: Option<ScoreWeights>,
}

impl RescoreRequest {
    /// Parses the optional request body. An empty body means no overrides.
    ///
    /// Broken JSON is a `BadRequest`; well-formed JSON of the wrong shape is a
    /// `Validation` error.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body).map_err(|e| match e.classify() {
            serde_json::error::Category::Data => {
                AppError::Validation(format!("Invalid rescore request: {}", e))
            }
            _ => AppError::BadRequest(format!("Malformed JSON body: {}", e)),
        })
    }
}

/// Query string of `GET /leads`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadSearchParams {
    pub search: Option<String>,
}

// ============ API Response Models ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadScoreResponse {
    pub id: i64,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionResponse {
    pub status: String,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMessageResponse {
    pub message: String,
    pub evaluation: crate::evaluation::MessageEvaluation,
}
