//! Rollout policies (spec §4.3 "Rollouts"): the four knowledge levels used once
//! the tree search reaches a leaf.

use crate::ftable::FTable;
use crate::history::History;
use crate::random::Rng;
use crate::simulator::{Reward, Simulator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutKnowledge {
    Random,
    Preferred,
    Pgs,
    PgsShaping,
}

/// Runs a Monte-Carlo trajectory from `state` to `max_depth`, accumulating
/// discounted reward (undiscounted reward is multiplied by `gamma^step` as the
/// trajectory progresses, matching the tree-search backup convention).
pub fn rollout<Sim: Simulator>(
    sim: &Sim,
    state: &mut Sim::State,
    history: &mut History,
    ftable: &FTable,
    knowledge: RolloutKnowledge,
    pgs_alpha: f64,
    max_depth: u32,
    rng: &mut Rng,
) -> Reward {
    let mut total = 0.0;
    let mut discount = 1.0;
    for _ in 0..max_depth {
        let action = match pick_action(sim, state, history, ftable, knowledge, rng) {
            Some(a) => a,
            None => break,
        };
        let shaping = knowledge == RolloutKnowledge::PgsShaping;
        let before = shaping.then(|| state.clone());
        let old_phi = before.as_ref().map(|s| sim.pgs(s));
        let outcome = sim.step(state, action, rng);
        let mut reward = outcome.reward;
        if let (Some(before), Some(old_phi)) = (before.as_ref(), old_phi) {
            let new_phi = sim.pgs_ro(before, state, action, old_phi);
            reward += pgs_alpha * (new_phi - old_phi);
        }
        total += discount * reward;
        history.push(action, outcome.observation);
        if outcome.terminal {
            break;
        }
        discount *= sim.discount();
    }
    total
}

fn pick_action<Sim: Simulator>(
    sim: &Sim,
    state: &Sim::State,
    history: &History,
    ftable: &FTable,
    knowledge: RolloutKnowledge,
    rng: &mut Rng,
) -> Option<usize> {
    match knowledge {
        RolloutKnowledge::Random => {
            let legal = sim.legal(state, history);
            if legal.is_empty() {
                None
            } else {
                Some(*rng.choose(&legal))
            }
        }
        RolloutKnowledge::Preferred => {
            let preferred = sim.preferred(state, history);
            if preferred.is_empty() {
                None
            } else {
                Some(*rng.choose(&preferred))
            }
        }
        RolloutKnowledge::Pgs | RolloutKnowledge::PgsShaping => {
            let candidates = sim.pgs_legal(state, history, ftable);
            if candidates.is_empty() {
                return None;
            }
            let phi_before = sim.pgs(state);
            let mut best_score = f64::NEG_INFINITY;
            let mut best: Vec<usize> = Vec::new();
            for &action in &candidates {
                let mut trial = state.clone();
                let mut trial_rng = rng.clone();
                sim.step(&mut trial, action, &mut trial_rng);
                let score = sim.pgs_ro(state, &trial, action, phi_before);
                if score > best_score + 1e-12 {
                    best_score = score;
                    best.clear();
                    best.push(action);
                } else if (score - best_score).abs() <= 1e-12 {
                    best.push(action);
                }
            }
            Some(*rng.choose(&best))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::assembly::pomdp::AssemblyPomdp;

    #[test]
    fn random_rollout_terminates_within_depth_budget() {
        let sim = AssemblyPomdp::demo();
        let mut ftable = FTable::new(-6.0, 1.0);
        sim.initialize_ftable(&mut ftable);
        let mut rng = Rng::from_seed(11);
        let mut state = sim.create_start_state(&mut rng);
        let mut history = History::new();
        let r = rollout(
            &sim,
            &mut state,
            &mut history,
            &ftable,
            RolloutKnowledge::Random,
            10.0,
            50,
            &mut rng,
        );
        assert!(r.is_finite());
    }
}
