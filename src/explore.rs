//! Cold-start exploration: epsilon-greedy distributions and seeded sampling.
//!
//! Sampling is a deterministic function of the seed string and the
//! distribution. Identical seed and distribution always yield the identical
//! chosen action, which is what makes logged decisions usable for offline
//! counterfactual evaluation.

use crate::response::RankingResponse;
use crate::status::{ApiError, ApiResult, ErrorCode};

/// Build a ranking for a context before any model is available.
///
/// Index 0 is treated as the caller's preferred action and receives
/// `1 - epsilon`; the remaining mass is spread uniformly over the rest.
/// The preferred action is emitted first, then the remaining actions in
/// index order. The chosen action is the deterministic sampled draw.
///
/// NOTE: taking index 0 as the top action is a policy choice inherited
/// from the context ordering, not a discovered best action.
pub fn explore_only(seed: &str, context: &str, epsilon: f32) -> ApiResult<RankingResponse> {
    let count = action_count(context)?;

    const TOP_ACTION: usize = 0;
    let pdf = epsilon_greedy_pdf(epsilon, TOP_ACTION, count)?;
    let chosen = sample_after_normalizing(seed, &pdf)?;

    let mut response = RankingResponse::new();
    response.push(TOP_ACTION, pdf[TOP_ACTION]);
    for (idx, prob) in pdf.iter().enumerate() {
        if idx != TOP_ACTION {
            response.push(idx, *prob);
        }
    }
    response.set_chosen_action_id(chosen);
    Ok(response)
}

/// Number of rankable actions in a context payload.
///
/// The context is JSON carrying the action set in a `_multi` array.
/// Malformed JSON fails with a parse error; a missing or empty `_multi`
/// fails with `ActionNotFound` (zero actions is an error, not an empty
/// response).
pub fn action_count(context: &str) -> ApiResult<usize> {
    let value: serde_json::Value = serde_json::from_str(context).map_err(|e| {
        ApiError::with_source(ErrorCode::ContextParse, "context is not valid json", e)
    })?;
    let count = value
        .get("_multi")
        .and_then(|m| m.as_array())
        .map(|a| a.len())
        .unwrap_or(0);
    if count == 0 {
        return Err(ApiError::new(
            ErrorCode::ActionNotFound,
            "context contains no actions to rank (empty or missing _multi)",
        ));
    }
    Ok(count)
}

/// Epsilon-greedy probability distribution over `count` actions:
/// `1 - epsilon` on `top_action`, `epsilon / (count - 1)` on each other
/// action. A single action receives all the mass.
pub fn epsilon_greedy_pdf(epsilon: f32, top_action: usize, count: usize) -> ApiResult<Vec<f32>> {
    if count == 0 {
        return Err(ApiError::new(ErrorCode::ExplorationError, "cannot explore over zero actions"));
    }
    if top_action >= count {
        return Err(ApiError::new(
            ErrorCode::ExplorationError,
            format!("top action {top_action} out of range for {count} actions"),
        ));
    }
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(ApiError::new(
            ErrorCode::ExplorationError,
            format!("epsilon {epsilon} outside [0, 1]"),
        ));
    }

    if count == 1 {
        return Ok(vec![1.0]);
    }
    let residual = epsilon / (count - 1) as f32;
    let mut pdf = vec![residual; count];
    pdf[top_action] = 1.0 - epsilon;
    Ok(pdf)
}

/// Draw an index from `pdf` as a deterministic function of `seed`.
///
/// The pdf is normalized before the draw; a degenerate distribution
/// (non-finite entries, negative entries, or zero total mass) fails with
/// an exploration error.
pub fn sample_after_normalizing(seed: &str, pdf: &[f32]) -> ApiResult<usize> {
    if pdf.is_empty() {
        return Err(ApiError::new(ErrorCode::ExplorationError, "cannot sample from an empty pdf"));
    }
    let mut total = 0.0f64;
    for &p in pdf {
        if !p.is_finite() || p < 0.0 {
            return Err(ApiError::new(
                ErrorCode::ExplorationError,
                format!("degenerate probability {p} in pdf"),
            ));
        }
        total += p as f64;
    }
    if total <= 0.0 {
        return Err(ApiError::new(ErrorCode::ExplorationError, "pdf has zero total mass"));
    }

    let draw = unit_interval(stable_hash64(seed));
    let mut cumulative = 0.0f64;
    for (idx, &p) in pdf.iter().enumerate() {
        cumulative += p as f64 / total;
        if draw < cumulative {
            return Ok(idx);
        }
    }
    // Floating accumulation can leave the final cumulative a hair below 1.
    Ok(pdf.len() - 1)
}

/// Deterministic (non-crypto) stable hash: FNV-1a over the seed bytes with
/// a SplitMix64 finalizer for bit diffusion. Stable across platforms.
fn stable_hash64(seed: &str) -> u64 {
    let mut h: u64 = 14695981039346656037;
    for b in seed.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(1099511628211);
    }
    splitmix64(h)
}

#[inline]
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Map a hash to [0, 1) using the top 53 bits.
#[inline]
fn unit_interval(h: u64) -> f64 {
    (h >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_sums_to_one() {
        for count in 1..=16 {
            let pdf = epsilon_greedy_pdf(0.2, 0, count).unwrap();
            assert_eq!(pdf.len(), count);
            let sum: f32 = pdf.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6, "sum {sum} for count {count}");
        }
    }

    #[test]
    fn test_pdf_matches_formula() {
        let pdf = epsilon_greedy_pdf(0.2, 0, 4).unwrap();
        assert!((pdf[0] - 0.8).abs() < 1e-6);
        for p in &pdf[1..] {
            assert!((p - 0.2 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_actions_is_an_error() {
        let err = epsilon_greedy_pdf(0.2, 0, 0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ExplorationError);
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let pdf = epsilon_greedy_pdf(0.2, 0, 4).unwrap();
        let first = sample_after_normalizing("u1", &pdf).unwrap();
        for _ in 0..50 {
            assert_eq!(sample_after_normalizing("u1", &pdf).unwrap(), first);
        }
    }

    #[test]
    fn test_sampling_varies_with_seed() {
        // Over many seeds the draw must not collapse to one index.
        let pdf = vec![0.25; 4];
        let mut seen = std::collections::HashSet::new();
        for i in 0..200 {
            seen.insert(sample_after_normalizing(&format!("seed-{i}"), &pdf).unwrap());
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_degenerate_pdf_rejected() {
        assert_eq!(
            sample_after_normalizing("s", &[0.0, 0.0]).unwrap_err().code(),
            ErrorCode::ExplorationError
        );
        assert_eq!(
            sample_after_normalizing("s", &[f32::NAN, 1.0]).unwrap_err().code(),
            ErrorCode::ExplorationError
        );
        assert_eq!(
            sample_after_normalizing("s", &[-0.5, 1.5]).unwrap_err().code(),
            ErrorCode::ExplorationError
        );
    }

    #[test]
    fn test_action_count_from_context() {
        let ctx = r#"{"shared":{"f":1},"_multi":[{"a":1},{"a":2},{"a":3}]}"#;
        assert_eq!(action_count(ctx).unwrap(), 3);
    }

    #[test]
    fn test_malformed_context_fails_parse() {
        let err = action_count("{not json").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ContextParse);
    }

    #[test]
    fn test_context_without_actions_fails() {
        let err = action_count(r#"{"_multi":[]}"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ActionNotFound);
        let err = action_count(r#"{"shared":{}}"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ActionNotFound);
    }

    #[test]
    fn test_explore_only_emits_top_first() {
        let ctx = r#"{"_multi":[{},{},{},{}]}"#;
        let resp = explore_only("u1", ctx, 0.2).unwrap();
        assert_eq!(resp.action_ids(), vec![0, 1, 2, 3]);
        assert!((resp.probabilities()[0] - 0.8).abs() < 1e-6);
        assert!(resp.chosen_action_id() < 4);
    }
}
