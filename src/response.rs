//! Ranking response returned by `choose_rank`.

use serde::Serialize;

/// One (action, probability) entry in a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionProb {
    pub action_id: usize,
    pub probability: f32,
}

/// Ordered action-probability distribution plus the chosen action.
///
/// Created empty by the caller, populated by the exploration engine or the
/// model capability, and finalized (event id and model id stamped) by the
/// façade before returning.
#[derive(Debug, Clone, Default)]
pub struct RankingResponse {
    event_id: String,
    model_id: String,
    chosen_action_id: usize,
    ranking: Vec<ActionProb>,
}

impl RankingResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all prior state. Called at the start of every `choose_rank`.
    pub fn reset(&mut self) {
        self.event_id.clear();
        self.model_id.clear();
        self.chosen_action_id = 0;
        self.ranking.clear();
    }

    pub fn push(&mut self, action_id: usize, probability: f32) {
        self.ranking.push(ActionProb { action_id, probability });
    }

    pub fn set_chosen_action_id(&mut self, action_id: usize) {
        self.chosen_action_id = action_id;
    }

    pub fn chosen_action_id(&self) -> usize {
        self.chosen_action_id
    }

    pub fn set_event_id(&mut self, event_id: &str) {
        self.event_id = event_id.to_string();
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn set_model_id(&mut self, model_id: &str) {
        self.model_id = model_id.to_string();
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn len(&self) -> usize {
        self.ranking.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionProb> {
        self.ranking.iter()
    }

    /// Action ids in emitted order.
    pub fn action_ids(&self) -> Vec<usize> {
        self.ranking.iter().map(|a| a.action_id).collect()
    }

    /// Probabilities in emitted order.
    pub fn probabilities(&self) -> Vec<f32> {
        self.ranking.iter().map(|a| a.probability).collect()
    }

    /// Probability of the chosen action, if present in the ranking.
    pub fn chosen_probability(&self) -> Option<f32> {
        self.ranking
            .iter()
            .find(|a| a.action_id == self.chosen_action_id)
            .map(|a| a.probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut resp = RankingResponse::new();
        resp.push(2, 0.5);
        resp.push(0, 0.3);
        resp.push(1, 0.2);
        assert_eq!(resp.action_ids(), vec![2, 0, 1]);
        assert_eq!(resp.probabilities(), vec![0.5, 0.3, 0.2]);
    }

    #[test]
    fn test_chosen_probability_lookup() {
        let mut resp = RankingResponse::new();
        resp.push(0, 0.8);
        resp.push(1, 0.2);
        resp.set_chosen_action_id(1);
        assert_eq!(resp.chosen_probability(), Some(0.2));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut resp = RankingResponse::new();
        resp.push(0, 1.0);
        resp.set_chosen_action_id(3);
        resp.set_event_id("e1");
        resp.set_model_id("m1");
        resp.reset();
        assert!(resp.is_empty());
        assert_eq!(resp.chosen_action_id(), 0);
        assert!(resp.event_id().is_empty());
        assert!(resp.model_id().is_empty());
    }
}
