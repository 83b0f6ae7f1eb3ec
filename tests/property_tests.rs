/// Property-based tests using proptest
/// Invariants of the checklist evaluator, score clamping and timestamp normalization
use proptest::prelude::*;
use rust_lead_crm::evaluation::{evaluate_response, POINTS_PER_CHECK};
use rust_lead_crm::lead_storage::normalize_timestamp;
use rust_lead_crm::models::{Lead, Stage};
use rust_lead_crm::pipeline::transition_for;
use rust_lead_crm::scoring::{clamp_score, parse_score};

fn lead(name: String, company: String, needs: String) -> Lead {
    Lead {
        id: 1,
        name,
        company,
        industry: "tech".to_string(),
        budget: 1_000.0,
        needs,
        score: 0.0,
        stage: Stage::PotentialLead,
        last_message: None,
        interaction_log: None,
    }
}

fn is_canonical_timestamp(s: &str) -> bool {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
}

// Property: evaluation score is 25 per passed check, tips cover the rest
proptest! {
    #[test]
    fn evaluation_score_matches_passed_checks(
        message in "\\PC{0,400}",
        name in "[A-Za-z]{1,12}",
        company in "[A-Za-z]{1,12}",
        needs in "[a-z ]{1,20}"
    ) {
        let eval = evaluate_response(&message, &lead(name, company, needs));

        prop_assert_eq!(eval.score, POINTS_PER_CHECK * eval.checks.passed());
        prop_assert!([0, 25, 50, 75, 100].contains(&eval.score));
        prop_assert_eq!(eval.recommendations.len() as u32, 4 - eval.checks.passed());
    }

    #[test]
    fn evaluation_length_check_follows_word_count(words in 0usize..260) {
        let message = vec!["word"; words].join(" ");
        let eval = evaluate_response(&message, &lead("Jane".into(), "Acme".into(), "automation".into()));

        prop_assert_eq!(eval.checks.length, (50..=200).contains(&words));
    }
}

// Property: stored scores always land in [0, 100]
proptest! {
    #[test]
    fn clamp_score_stays_in_range(score in proptest::num::f64::ANY) {
        prop_assume!(!score.is_nan());
        let clamped = clamp_score(score);
        prop_assert!((0.0..=100.0).contains(&clamped));
    }

    #[test]
    fn parse_score_never_panics(raw in "\\PC*") {
        if let Ok(score) = parse_score(&raw) {
            prop_assert!(!score.is_nan());
        }
    }

    #[test]
    fn parse_score_accepts_padded_numbers(score in -1000.0f64..1000.0, pad in " {0,3}") {
        let raw = format!("{}{}{}", pad, score, pad);
        prop_assert_eq!(parse_score(&raw).unwrap(), score);
    }
}

// Property: normalization always yields the canonical layout
proptest! {
    #[test]
    fn normalize_timestamp_never_panics(raw in "\\PC*") {
        let value = serde_json::Value::String(raw);
        prop_assert!(is_canonical_timestamp(&normalize_timestamp(Some(&value))));
    }

    #[test]
    fn normalize_timestamp_keeps_wall_clock_fields(
        year in 1970i32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
        hour in 0u32..24,
        minute in 0u32..60,
        second in 0u32..60,
        sep in prop_oneof![Just('T'), Just(' ')]
    ) {
        let raw = format!("{:04}-{:02}-{:02}{}{:02}:{:02}:{:02}", year, month, day, sep, hour, minute, second);
        let expected = format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}", year, month, day, hour, minute, second);
        let value = serde_json::Value::String(raw);

        prop_assert_eq!(normalize_timestamp(Some(&value)), expected);
    }
}

// Property: only the two exact direction literals are accepted
proptest! {
    #[test]
    fn unknown_directions_are_rejected(direction in "[a-zA-Z]{0,12}") {
        prop_assume!(direction != "inbound" && direction != "outbound");
        prop_assert!(transition_for(&direction).is_err());
    }
}
