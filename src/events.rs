//! Serialization of decision and outcome events.
//!
//! Events use the decision-service interaction schema: the ranking event
//! carries the emitted action order (`a`), the caller's context verbatim
//! (`c`), the sampling probabilities (`p`), and the model that produced the
//! ranking; the outcome event keys a reward payload by event id.

use serde::Serialize;
use serde_json::value::RawValue;

use crate::response::RankingResponse;
use crate::status::{ApiError, ApiResult, ErrorCode};

#[derive(Serialize)]
struct RankingEvent<'a> {
    #[serde(rename = "Version")]
    version: &'static str,
    #[serde(rename = "EventId")]
    event_id: &'a str,
    a: Vec<usize>,
    c: &'a RawValue,
    p: Vec<f32>,
    #[serde(rename = "VWState")]
    vw_state: VwState<'a>,
}

#[derive(Serialize)]
struct VwState<'a> {
    m: &'a str,
}

#[derive(Serialize)]
struct OutcomeEvent<'a> {
    #[serde(rename = "EventId")]
    event_id: &'a str,
    v: &'a str,
}

/// Serialize a ranking event for the logging sink.
pub fn serialize_ranking(
    event_id: &str,
    context: &str,
    response: &RankingResponse,
) -> ApiResult<Vec<u8>> {
    let context = RawValue::from_string(context.to_string()).map_err(|e| {
        ApiError::with_source(ErrorCode::ContextParse, "context is not valid json", e)
    })?;
    let event = RankingEvent {
        version: "1",
        event_id,
        a: response.action_ids(),
        c: &context,
        p: response.probabilities(),
        vw_state: VwState { m: response.model_id() },
    };
    serde_json::to_vec(&event).map_err(|e| {
        ApiError::with_source(ErrorCode::EventSerialization, "failed to serialize ranking event", e)
    })
}

/// Serialize an outcome event for the logging sink.
pub fn serialize_outcome(event_id: &str, outcome: &str) -> ApiResult<Vec<u8>> {
    let event = OutcomeEvent { event_id, v: outcome };
    serde_json::to_vec(&event).map_err(|e| {
        ApiError::with_source(ErrorCode::EventSerialization, "failed to serialize outcome event", e)
    })
}

/// Canonical outcome-data representation of a float reward.
pub fn reward_to_outcome(reward: f32) -> String {
    format!("{reward:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_event_shape() {
        let mut resp = RankingResponse::new();
        resp.push(0, 0.8);
        resp.push(1, 0.2);
        resp.set_chosen_action_id(0);
        resp.set_model_id("N/A");

        let ctx = r#"{"_multi":[{},{}]}"#;
        let bytes = serialize_ranking("u1", ctx, &resp).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["Version"], "1");
        assert_eq!(value["EventId"], "u1");
        assert_eq!(value["a"], serde_json::json!([0, 1]));
        assert_eq!(value["c"]["_multi"].as_array().unwrap().len(), 2);
        assert_eq!(value["p"].as_array().unwrap().len(), 2);
        assert_eq!(value["VWState"]["m"], "N/A");
    }

    #[test]
    fn test_ranking_event_rejects_invalid_context() {
        let resp = RankingResponse::new();
        let err = serialize_ranking("u1", "{broken", &resp).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ContextParse);
    }

    #[test]
    fn test_outcome_event_shape() {
        let bytes = serialize_outcome("u1", "0.750000").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["EventId"], "u1");
        assert_eq!(value["v"], "0.750000");
    }

    #[test]
    fn test_reward_formatting() {
        assert_eq!(reward_to_outcome(0.75), "0.750000");
        assert_eq!(reward_to_outcome(1.0), "1.000000");
        assert_eq!(reward_to_outcome(-0.5), "-0.500000");
    }
}
