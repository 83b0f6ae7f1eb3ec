//! Checklist evaluation of outreach messages.

use serde::{Deserialize, Serialize};

use crate::models::Lead;

pub const MIN_WORDS: usize = 50;
pub const MAX_WORDS: usize = 200;
pub const POINTS_PER_CHECK: u32 = 25;

const PERSONALIZATION_TIP: &str = "Add lead's name and company for better personalization.";
const RELEVANCE_TIP: &str = "Incorporate lead's specific needs for relevance.";
const LENGTH_TIP: &str = "Adjust message length to 50-200 words.";
const TONE_TIP: &str = "Ensure a professional or friendly tone.";

/// Outcome of each checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationChecks {
    /// Message names both the lead and the company.
    pub personalization: bool,
    /// Message mentions the lead's needs (case-insensitive).
    pub relevance: bool,
    /// Word count within [50, 200].
    pub length: bool,
    /// Message reads "professional" or "friendly" (case-insensitive).
    pub tone: bool,
}

impl EvaluationChecks {
    pub fn passed(&self) -> u32 {
        [self.personalization, self.relevance, self.length, self.tone]
            .iter()
            .filter(|c| **c)
            .count() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvaluation {
    /// Always a multiple of 25 between 0 and 100.
    pub score: u32,
    pub checks: EvaluationChecks,
    pub recommendations: Vec<String>,
}

/// Scores `message` against the four-point checklist for `lead`.
pub fn evaluate_response(message: &str, lead: &Lead) -> MessageEvaluation {
    let lowered = message.to_lowercase();
    let words = message.split_whitespace().count();

    let checks = EvaluationChecks {
        personalization: message.contains(lead.name.as_str())
            && message.contains(lead.company.as_str()),
        relevance: lowered.contains(&lead.needs.to_lowercase()),
        length: (MIN_WORDS..=MAX_WORDS).contains(&words),
        tone: lowered.contains("professional") || lowered.contains("friendly"),
    };

    let recommendations = [
        (checks.personalization, PERSONALIZATION_TIP),
        (checks.relevance, RELEVANCE_TIP),
        (checks.length, LENGTH_TIP),
        (checks.tone, TONE_TIP),
    ]
    .into_iter()
    .filter(|(passed, _)| !passed)
    .map(|(_, tip)| tip.to_string())
    .collect();

    MessageEvaluation {
        score: POINTS_PER_CHECK * checks.passed(),
        checks,
        recommendations,
    }
}
