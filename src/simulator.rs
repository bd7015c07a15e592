//! The domain simulator contract (spec §4.2).
//!
//! The planner is polymorphic over any simulator implementing this trait — a
//! capability interface with no runtime type inspection, per Design Notes
//! ("Re-architect as a capability interface"). This mirrors the teacher's
//! `mccfr::traits::{TreeGame, TreeInfo, ...}` associated-type trait family
//! (`src/mccfr/traits/game.rs`): one trait, many domains, no downcasting.

use crate::ftable::FTable;
use crate::history::History;
use crate::random::Rng;

pub type ActionIndex = usize;
pub type ObsIndex = usize;
pub type Reward = f64;

/// Outcome of one stochastic transition + observation + reward (spec §4.2 `step`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub observation: ObsIndex,
    pub reward: Reward,
    pub terminal: bool,
}

pub trait Simulator {
    /// An immutable-per-rollout particle snapshot (spec §3).
    type State: Clone;

    fn num_actions(&self) -> usize;
    fn num_observations(&self) -> usize;
    fn discount(&self) -> f64;
    /// Used to auto-tune UCB's exploration constant when not explicitly overridden.
    fn reward_range(&self) -> f64;

    /// Draws an initial state from the prior.
    fn create_start_state(&self, rng: &mut Rng) -> Self::State;

    /// Stochastic transition + observation + reward. Must depend only on `state`,
    /// `action` and `rng` (spec: "pure ... depending only on state, action, and the
    /// simulator's random source").
    fn step(&self, state: &mut Self::State, action: ActionIndex, rng: &mut Rng) -> StepOutcome;

    /// Potential function Phi(s).
    fn pgs(&self, state: &Self::State) -> f64;

    /// Fast incremental Phi(s') avoiding full recomputation when only local deltas
    /// apply. `old_phi` is Phi(old) as previously computed.
    fn pgs_ro(&self, old: &Self::State, new: &Self::State, action: ActionIndex, old_phi: f64) -> f64;

    /// Full candidate action set.
    fn legal(&self, state: &Self::State, history: &History) -> Vec<ActionIndex>;

    /// Pruned candidate set used by "Preferred" rollouts.
    fn preferred(&self, state: &Self::State, history: &History) -> Vec<ActionIndex>;

    /// The PGS-shaped rollout's legal set: `legal` filtered by IRE activation.
    /// Per spec Open Questions, IRE gating is always-on here (not conditioned on
    /// whether `preferred` was ever consulted).
    fn pgs_legal(
        &self,
        state: &Self::State,
        history: &History,
        ftable: &FTable,
    ) -> Vec<ActionIndex> {
        self.legal(state, history)
            .into_iter()
            .filter(|a| ftable.is_active(*a))
            .collect()
    }

    /// Apply a small random perturbation to `state` in place; return whether the
    /// perturbed state is consistent with the last (action, observation) in
    /// `history` paired with `step_obs`. Callers discard the perturbation on
    /// `false` (the mutation happened regardless; only commit on `true`).
    fn local_move(
        &self,
        state: &mut Self::State,
        history: &History,
        step_obs: ObsIndex,
        rng: &mut Rng,
    ) -> bool;

    /// Register action -> feature mappings and the activation threshold.
    fn initialize_ftable(&self, ftable: &mut FTable);
}
