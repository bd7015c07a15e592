//! Incremental Relevance Estimation (spec §4.3 "IRE interaction", GLOSSARY).
//!
//! A per-feature exponentially-smoothed value estimate gates action legality during
//! PGS-shaped rollouts: an action whose feature's value has fallen below the
//! (negative) activation threshold is pruned from `pgs_legal` (spec Open Questions:
//! "spec treats IRE as always-on for `pgsLegal`" — there is no separate "did we
//! ever see `preferred`" gate here, unlike the original implementation).

use std::collections::HashMap;

use crate::simulator::ActionIndex;

#[derive(Debug, Clone)]
pub struct FTable {
    /// action -> feature id, registered once by `Simulator::initialize_ftable`.
    feature_of_action: HashMap<ActionIndex, usize>,
    /// feature id -> smoothed value estimate. Starts at 0.0 ("features begin
    /// active"; the threshold is negative, so 0.0 is active by construction).
    values: Vec<f64>,
    /// negative; an action is active iff its feature's value is >= threshold.
    activation_threshold: f64,
    /// learning rate eta used in the convex-combination update.
    transition_rate: f64,
}

impl FTable {
    pub fn new(activation_threshold: f64, transition_rate: f64) -> Self {
        assert!(
            activation_threshold < 0.0,
            "IRE activation threshold must be negative"
        );
        Self {
            feature_of_action: HashMap::new(),
            values: Vec::new(),
            activation_threshold,
            transition_rate,
        }
    }

    /// Register that `action` affects `feature`, allocating storage for the
    /// feature's running value if this is the first time it's seen.
    pub fn register(&mut self, action: ActionIndex, feature: usize) {
        if feature >= self.values.len() {
            self.values.resize(feature + 1, 0.0);
        }
        self.feature_of_action.insert(action, feature);
    }

    pub fn is_active(&self, action: ActionIndex) -> bool {
        match self.feature_of_action.get(&action) {
            // Actions with no registered feature are never gated.
            None => true,
            Some(&feature) => self.values[feature] >= self.activation_threshold,
        }
    }

    /// Update the feature backing `action` with return `rollout_return` against
    /// the current value estimate `current_value`: f <- (1-eta)*f + eta*(R - Q).
    pub fn update(&mut self, action: ActionIndex, rollout_return: f64, current_value: f64) {
        let Some(&feature) = self.feature_of_action.get(&action) else {
            return;
        };
        let delta = rollout_return - current_value;
        let eta = self.transition_rate;
        let old = self.values[feature];
        self.values[feature] = (1.0 - eta) * old + eta * delta;
    }

    pub fn value_of(&self, action: ActionIndex) -> Option<f64> {
        self.feature_of_action
            .get(&action)
            .map(|&f| self.values[f])
    }

    pub fn activation_threshold(&self) -> f64 {
        self.activation_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convex_combination_matches_spec_formula() {
        let mut table = FTable::new(-6.0, 0.5);
        table.register(3, 0);
        // delta = R - Q = 2.0 - 1.0 = 1.0; new = (1-0.5)*0.0 + 0.5*1.0 = 0.5
        table.update(3, 2.0, 1.0);
        assert!((table.value_of(3).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn pruning_kicks_in_once_value_drops_below_threshold() {
        let mut table = FTable::new(-1.0, 1.0);
        table.register(5, 0);
        assert!(table.is_active(5));
        // transition_rate = 1.0 -> value becomes the delta outright.
        table.update(5, -10.0, 0.0);
        assert!(!table.is_active(5));
    }

    #[test]
    fn unregistered_actions_are_always_active() {
        let table = FTable::new(-6.0, 1.0);
        assert!(table.is_active(42));
    }
}
