//! Lead pipeline stage transitions.
//!
//! The stage is derived from the direction of the most recently recorded
//! interaction only. History is not aggregated: an outbound message sent after
//! an inbound reply moves the lead back to `reached_out`. The machine never
//! returns a lead to `potential_lead`.

use crate::errors::AppError;
use crate::models::{Direction, Stage};

/// Stage a lead moves to once an interaction in `direction` is recorded.
pub fn stage_after(direction: Direction) -> Stage {
    match direction {
        Direction::Outbound => Stage::ReachedOut,
        Direction::Inbound => Stage::ResponseReceived,
    }
}

/// Parses a caller-supplied direction and returns it with its target stage.
///
/// Fails with `InvalidDirection` for anything other than `inbound`/`outbound`,
/// before any write is attempted.
pub fn transition_for(direction: &str) -> Result<(Direction, Stage), AppError> {
    let direction: Direction = direction.parse()?;
    Ok((direction, stage_after(direction)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_reaches_out() {
        assert_eq!(stage_after(Direction::Outbound), Stage::ReachedOut);
    }

    #[test]
    fn test_inbound_marks_response() {
        assert_eq!(stage_after(Direction::Inbound), Stage::ResponseReceived);
    }

    #[test]
    fn test_latest_interaction_wins() {
        let history = ["outbound", "inbound", "outbound"];
        let last = history
            .iter()
            .map(|d| transition_for(d).unwrap().1)
            .last()
            .unwrap();
        assert_eq!(last, Stage::ReachedOut);
    }

    #[test]
    fn test_never_returns_to_potential_lead() {
        for direction in [Direction::Inbound, Direction::Outbound] {
            assert_ne!(stage_after(direction), Stage::PotentialLead);
        }
    }

    #[test]
    fn test_unknown_direction_rejected() {
        let err = transition_for("sideways").unwrap_err();
        assert!(matches!(err, AppError::InvalidDirection(_)));
    }
}
