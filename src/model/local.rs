//! Default in-process model backend.
//!
//! Model data is decoded as little-endian f32 action weights. Ranking
//! applies a softmax over the weights (cycling when the context holds more
//! actions than weights) and samples the chosen action deterministically
//! from the seed. The whole decoded model lives in one snapshot value that
//! is swapped atomically under a write lock, so concurrent rankings read
//! either the previous model or the new one in full.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use super::{ModelCapability, ModelData};
use crate::explore;
use crate::response::RankingResponse;
use crate::status::{ApiError, ApiResult, ErrorCode};

struct Snapshot {
    weights: Vec<f32>,
    model_id: String,
    refresh_count: u32,
}

/// In-process model selected by the `"local"` factory key.
pub struct LocalModel {
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl LocalModel {
    pub fn new() -> Self {
        Self { snapshot: RwLock::new(None) }
    }

    fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().clone()
    }

    /// Refresh count of the active snapshot, if any. Used by tests and
    /// host health reporting.
    pub fn refresh_count(&self) -> Option<u32> {
        self.snapshot().map(|s| s.refresh_count)
    }
}

impl Default for LocalModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelCapability for LocalModel {
    fn update(&self, data: &ModelData) -> ApiResult<()> {
        if data.is_empty() {
            return Err(ApiError::new(ErrorCode::ModelUpdateFailed, "empty model payload"));
        }
        let weights: Vec<f32> = data
            .data()
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        if weights.is_empty() {
            return Err(ApiError::new(
                ErrorCode::ModelUpdateFailed,
                format!("model payload of {} bytes holds no complete weight", data.len()),
            ));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(ApiError::new(
                ErrorCode::ModelUpdateFailed,
                "non-finite weight in model payload",
            ));
        }

        let digest = Sha256::digest(data.data());
        let snapshot = Arc::new(Snapshot {
            weights,
            model_id: hex::encode(&digest[..8]),
            refresh_count: data.refresh_count(),
        });
        *self.snapshot.write() = Some(snapshot);
        Ok(())
    }

    fn rank(&self, seed: &str, context: &str) -> ApiResult<RankingResponse> {
        let snapshot = self.snapshot().ok_or_else(|| {
            ApiError::new(ErrorCode::ModelRankFailed, "rank called before first model update")
        })?;
        let count = explore::action_count(context)?;

        let scores: Vec<f32> =
            (0..count).map(|i| snapshot.weights[i % snapshot.weights.len()]).collect();
        let pdf = softmax(&scores);
        let chosen = explore::sample_after_normalizing(seed, &pdf)?;

        // Emit in descending probability, index as the stable tie-break.
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by(|&a, &b| {
            pdf[b].partial_cmp(&pdf[a]).unwrap_or(Ordering::Equal).then(a.cmp(&b))
        });

        let mut response = RankingResponse::new();
        for idx in order {
            response.push(idx, pdf[idx]);
        }
        response.set_chosen_action_id(chosen);
        response.set_model_id(&snapshot.model_id);
        Ok(response)
    }
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights_bytes(weights: &[f32]) -> Vec<u8> {
        weights.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    const CTX3: &str = r#"{"_multi":[{},{},{}]}"#;

    #[test]
    fn test_update_rejects_empty_payload() {
        let model = LocalModel::new();
        let err = model.update(&ModelData::new(Vec::new(), 1)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ModelUpdateFailed);
    }

    #[test]
    fn test_update_rejects_undersized_payload() {
        let model = LocalModel::new();
        let err = model.update(&ModelData::new(vec![1, 2, 3], 1)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ModelUpdateFailed);
    }

    #[test]
    fn test_rank_before_update_fails() {
        let model = LocalModel::new();
        let err = model.rank("u1", CTX3).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ModelRankFailed);
    }

    #[test]
    fn test_rank_distribution_is_valid() {
        let model = LocalModel::new();
        model.update(&ModelData::new(weights_bytes(&[2.0, 0.5, 1.0]), 1)).unwrap();

        let resp = model.rank("u1", CTX3).unwrap();
        assert_eq!(resp.len(), 3);
        let sum: f32 = resp.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        // Highest weight leads the emitted order.
        assert_eq!(resp.action_ids()[0], 0);
        assert!(!resp.model_id().is_empty());
        assert!(resp.chosen_probability().is_some());
    }

    #[test]
    fn test_rank_is_deterministic_per_seed() {
        let model = LocalModel::new();
        model.update(&ModelData::new(weights_bytes(&[1.0, 1.0, 1.0]), 1)).unwrap();

        let first = model.rank("fixed-seed", CTX3).unwrap();
        for _ in 0..20 {
            let again = model.rank("fixed-seed", CTX3).unwrap();
            assert_eq!(again.chosen_action_id(), first.chosen_action_id());
            assert_eq!(again.action_ids(), first.action_ids());
        }
    }

    #[test]
    fn test_weights_cycle_over_larger_action_sets() {
        let model = LocalModel::new();
        model.update(&ModelData::new(weights_bytes(&[1.0, 2.0]), 1)).unwrap();

        let ctx5 = r#"{"_multi":[{},{},{},{},{}]}"#;
        let resp = model.rank("u1", ctx5).unwrap();
        assert_eq!(resp.len(), 5);
    }

    #[test]
    fn test_update_swaps_model_id() {
        let model = LocalModel::new();
        model.update(&ModelData::new(weights_bytes(&[1.0]), 1)).unwrap();
        let first = model.rank("u1", CTX3).unwrap().model_id().to_string();
        model.update(&ModelData::new(weights_bytes(&[5.0]), 2)).unwrap();
        let second = model.rank("u1", CTX3).unwrap().model_id().to_string();
        assert_ne!(first, second);
        assert_eq!(model.refresh_count(), Some(2));
    }
}
