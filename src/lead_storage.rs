use crate::errors::AppError;
use crate::models::{Direction, Interaction, Lead, LeadUpdate, NewLead, Stage};
use crate::pipeline;
use crate::scoring::clamp_score;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use moka::future::Cache;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Canonical stored timestamp layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LEAD_COLUMNS: &str =
    "id, name, company, industry, budget, needs, score, stage, last_message, interaction_log";

/// Record store for leads and their interactions.
#[derive(Clone)]
pub struct LeadStorage {
    pool: SqlitePool,
    /// Per-lead mutexes serializing interaction writes. Unbounded with no
    /// expiry, so a held mutex is never replaced; entries leave only when their
    /// lead is deleted.
    lead_locks: Cache<i64, Arc<Mutex<()>>>,
}

impl LeadStorage {
    pub fn new(pool: SqlitePool) -> Self {
        let lead_locks = Cache::builder().build();
        Self { pool, lead_locks }
    }

    /// Insert a lead with score 0 and stage `potential_lead`.
    ///
    /// Fails with `Constraint` when `(name, company)` already exists.
    pub async fn create_lead(&self, lead: &NewLead) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leads (name, company, industry, budget, needs, score, stage)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(&lead.name)
        .bind(&lead.company)
        .bind(&lead.industry)
        .bind(lead.budget)
        .bind(&lead.needs)
        .bind(Stage::PotentialLead)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            tracing::warn!(
                "Failed to insert lead ({}, {}): {}",
                lead.name,
                lead.company,
                err
            );
            err
        })?;

        let id = result.last_insert_rowid();
        tracing::info!("Stored lead {} ({} at {})", id, lead.name, lead.company);
        Ok(id)
    }

    /// All leads ordered by id, or the single lead with `lead_id` (empty when absent).
    pub async fn get_leads(&self, lead_id: Option<i64>) -> Result<Vec<Lead>, AppError> {
        let leads = match lead_id {
            Some(id) => {
                sqlx::query_as::<_, Lead>(&format!(
                    "SELECT {} FROM leads WHERE id = ?",
                    LEAD_COLUMNS
                ))
                .bind(id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Lead>(&format!(
                    "SELECT {} FROM leads ORDER BY id",
                    LEAD_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(leads)
    }

    pub async fn get_lead(&self, lead_id: i64) -> Result<Option<Lead>, AppError> {
        Ok(self.get_leads(Some(lead_id)).await?.into_iter().next())
    }

    /// Apply the present fields of `update` to a lead.
    ///
    /// Returns the number of rows touched; 0 for an empty update or a missing id.
    pub async fn update_lead(&self, lead_id: i64, update: &LeadUpdate) -> Result<u64, AppError> {
        if update.is_empty() {
            return Ok(0);
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE leads SET ");
        {
            let mut columns = query.separated(", ");
            if let Some(name) = &update.name {
                columns.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(company) = &update.company {
                columns.push("company = ").push_bind_unseparated(company.clone());
            }
            if let Some(industry) = &update.industry {
                columns.push("industry = ").push_bind_unseparated(industry.clone());
            }
            if let Some(budget) = update.budget {
                columns.push("budget = ").push_bind_unseparated(budget);
            }
            if let Some(needs) = &update.needs {
                columns.push("needs = ").push_bind_unseparated(needs.clone());
            }
            if let Some(last_message) = &update.last_message {
                columns
                    .push("last_message = ")
                    .push_bind_unseparated(last_message.clone());
            }
            if let Some(interaction_log) = &update.interaction_log {
                columns
                    .push("interaction_log = ")
                    .push_bind_unseparated(interaction_log.clone());
            }
        }
        query.push(" WHERE id = ").push_bind(lead_id);

        let rows = query.build().execute(&self.pool).await?.rows_affected();
        if rows == 0 {
            tracing::debug!("update_lead: no lead with id {}", lead_id);
        }
        Ok(rows)
    }

    /// Persist a qualification score, clamped to [0, 100].
    pub async fn set_score(&self, lead_id: i64, score: f64) -> Result<u64, AppError> {
        let score = if score.is_nan() { 0.0 } else { clamp_score(score) };
        let rows = sqlx::query("UPDATE leads SET score = ? WHERE id = ?")
            .bind(score)
            .bind(lead_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows)
    }

    /// Substring search over company, needs and interaction log.
    ///
    /// SQLite `LIKE` folds ASCII case. Wildcards in `query` match literally.
    pub async fn search_leads(&self, query: &str) -> Result<Vec<Lead>, AppError> {
        let pattern = format!("%{}%", escape_like(query));
        let leads = sqlx::query_as::<_, Lead>(&format!(
            r#"
            SELECT {} FROM leads
            WHERE company LIKE ? ESCAPE '\'
               OR needs LIKE ? ESCAPE '\'
               OR interaction_log LIKE ? ESCAPE '\'
            ORDER BY id
            "#,
            LEAD_COLUMNS
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(leads)
    }

    /// Record an interaction and move the lead to the stage it implies.
    ///
    /// The insert and the stage update share one transaction and run under the
    /// lead's mutex. Fails with `Constraint` when the lead does not exist.
    pub async fn record_interaction(
        &self,
        lead_id: i64,
        message: &str,
        direction: Direction,
        timestamp: Option<&serde_json::Value>,
    ) -> Result<i64, AppError> {
        let stage = pipeline::stage_after(direction);
        let timestamp = normalize_timestamp(timestamp);

        let lock = self.lead_lock(lead_id).await;
        let _guard = lock.lock().await;

        let mut tx = self.pool.begin().await?;

        let interaction_id = sqlx::query(
            r#"
            INSERT INTO interactions (lead_id, message, direction, timestamp)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(lead_id)
        .bind(message)
        .bind(direction)
        .bind(&timestamp)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let updated = sqlx::query("UPDATE leads SET stage = ? WHERE id = ?")
            .bind(stage)
            .bind(lead_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if updated == 0 {
            // Dropping the transaction rolls the insert back
            return Err(AppError::Constraint(format!(
                "lead {} does not exist",
                lead_id
            )));
        }

        tx.commit().await?;

        tracing::info!(
            "Recorded {} interaction {} for lead {} -> stage {}",
            direction,
            interaction_id,
            lead_id,
            stage
        );
        Ok(interaction_id)
    }

    /// Interactions of a lead in insertion order.
    pub async fn list_interactions(&self, lead_id: i64) -> Result<Vec<Interaction>, AppError> {
        let interactions = sqlx::query_as::<_, Interaction>(
            "SELECT id, lead_id, message, direction, timestamp FROM interactions WHERE lead_id = ? ORDER BY id",
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(interactions)
    }

    /// Delete a lead; its interactions go with it.
    pub async fn delete_lead(&self, lead_id: i64) -> Result<u64, AppError> {
        let rows = sqlx::query("DELETE FROM leads WHERE id = ?")
            .bind(lead_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if rows > 0 {
            self.lead_locks.invalidate(&lead_id).await;
            tracing::info!("Deleted lead {} and its interactions", lead_id);
        }
        Ok(rows)
    }

    async fn lead_lock(&self, lead_id: i64) -> Arc<Mutex<()>> {
        self.lead_locks
            .get_with(lead_id, async { Arc::new(Mutex::new(())) })
            .await
    }
}

/// Best-effort timestamp normalization to `YYYY-MM-DD HH:MM:SS`.
///
/// Accepts RFC 3339 and ISO-8601 strings (`T` or space separator, optional
/// fractional seconds and offset) and bare dates. Sub-seconds and the offset
/// are dropped, keeping wall-clock fields. Anything else yields the current
/// UTC time.
pub fn normalize_timestamp(value: Option<&serde_json::Value>) -> String {
    value
        .and_then(|v| v.as_str())
        .and_then(parse_datetime)
        // UTC rather than host-local time, matching SQLite's CURRENT_TIMESTAMP
        .unwrap_or_else(|| Utc::now().naive_utc())
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    const WITH_OFFSET: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];
    for fmt in WITH_OFFSET {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.naive_local());
        }
    }

    const NAIVE: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in NAIVE {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
