//! The planner proper: tree search loop (spec §4.3), and the belief-state
//! update that follows a real action (spec §4.3 "Belief propagation after
//! real step").

use std::time::{Duration, Instant};

use petgraph::graph::NodeIndex;

use crate::belief::BeliefState;
use crate::ftable::FTable;
use crate::history::History;
use crate::random::Rng;
use crate::simulator::{ActionIndex, ObsIndex, Simulator};

use super::rollout::{self, RolloutKnowledge};
use super::tree::Tree;
use super::ucb;
use super::{TreeKnowledge, Update};

/// Search-budget and knowledge-level configuration (spec §4.3 "Parameters",
/// §6 "One-shot form").
#[derive(Debug, Clone)]
pub struct PlannerParams {
    pub sim_doubles: u32,
    pub transform_doubles: u32,
    pub transform_attempts: u32,
    pub timeout: Duration,
    pub exploration_c: Option<f64>,
    pub accuracy: f64,
    pub tree_knowledge: TreeKnowledge,
    pub rollout_knowledge: RolloutKnowledge,
    pub pgs_alpha: f64,
}

impl PlannerParams {
    pub fn num_simulations(&self) -> u64 {
        1u64 << self.sim_doubles
    }

    pub fn num_start_states(&self) -> u64 {
        1u64 << self.sim_doubles
    }

    pub fn num_transforms(&self) -> u64 {
        (1u64 << (self.sim_doubles + self.transform_doubles)).max(1)
    }

    pub fn max_attempts(&self) -> u64 {
        self.num_transforms() * self.transform_attempts as u64
    }

    /// `ceil(log_gamma(accuracy))`, the gamma-horizon rollout truncation depth.
    pub fn max_depth(&self, discount: f64) -> u32 {
        if discount >= 1.0 {
            return u32::MAX / 2;
        }
        let depth = self.accuracy.ln() / discount.ln();
        depth.ceil().max(1.0) as u32
    }

    fn exploration_c(&self, reward_range: f64) -> f64 {
        self.exploration_c.unwrap_or(reward_range)
    }
}

/// Owns exactly one search tree per run (spec §5: "within a run the tree is
/// single-owner").
pub struct Planner<Sim: Simulator> {
    params: PlannerParams,
    ftable: FTable,
    rng: Rng,
    tree: Tree<Sim::State>,
}

impl<Sim: Simulator> Planner<Sim> {
    pub fn new(sim: &Sim, params: PlannerParams, mut ftable: FTable, rng: Rng) -> Self {
        sim.initialize_ftable(&mut ftable);
        Self { params, ftable, rng, tree: Tree::empty() }
    }

    pub fn ftable(&self) -> &FTable {
        &self.ftable
    }

    /// Runs up to `numSimulations` trajectories (or until `timeout` elapses,
    /// whichever comes first) from a fresh tree rooted at `belief`, and
    /// returns the action with the greatest visit-weighted value (spec §5
    /// "Cancellation / timeout").
    pub fn plan(&mut self, sim: &Sim, belief: &BeliefState<Sim::State>, history: &History) -> ActionIndex {
        self.tree = Tree::empty();
        let root = self.tree.add_belief();

        let seed_states = self.seed_root_states(sim, belief);
        let deadline = Instant::now() + self.params.timeout;
        let max_depth = self.params.max_depth(sim.discount());

        for i in 0..self.params.num_simulations() {
            if Instant::now() >= deadline {
                break;
            }
            let mut state = seed_states[(i as usize) % seed_states.len()].clone();
            let mut sim_history = history.clone();
            self.simulate(sim, root, &mut state, &mut sim_history, max_depth);
        }

        let best = ucb::best_action(&self.tree, root);
        self.tree.node(best).as_action().action
    }

    fn seed_root_states(&mut self, sim: &Sim, belief: &BeliefState<Sim::State>) -> Vec<Sim::State> {
        if !belief.is_empty() {
            return belief.iter().cloned().collect();
        }
        (0..self.params.num_start_states())
            .map(|_| sim.create_start_state(&mut self.rng))
            .collect()
    }

    /// One MCTS trajectory: descend the tree via UCB1 until a leaf, expand it,
    /// finish with a knowledge-level rollout, then back up visit counts,
    /// values and the F-table along the path taken.
    fn simulate(
        &mut self,
        sim: &Sim,
        belief_node: NodeIndex,
        state: &mut Sim::State,
        history: &mut History,
        depth: u32,
    ) -> f64 {
        self.tree
            .node_mut(belief_node)
            .as_belief_mut()
            .belief
            .add(state.clone());

        if depth == 0 {
            return 0.0;
        }

        if self.tree.action_children(belief_node).is_empty() {
            self.expand(sim, belief_node, state, history);
            if self.tree.action_children(belief_node).is_empty() {
                // No legal (IRE-active) action at this belief: nothing more to
                // simulate from here.
                return 0.0;
            }
            return rollout::rollout(
                sim,
                state,
                history,
                &self.ftable,
                self.params.rollout_knowledge,
                self.params.pgs_alpha,
                depth,
                &mut self.rng,
            );
        }

        let exploration_c = self.params.exploration_c(sim.reward_range());
        let action_node = ucb::select(&self.tree, belief_node, exploration_c, &mut self.rng);
        let action = self.tree.node(action_node).as_action().action;

        let old_phi = matches!(self.params.tree_knowledge, TreeKnowledge::Pgs).then(|| sim.pgs(state));
        let before = state.clone();
        let outcome = sim.step(state, action, &mut self.rng);
        let mut reward = outcome.reward;
        if let Some(old_phi) = old_phi {
            let new_phi = sim.pgs_ro(&before, state, action, old_phi);
            reward += self.params.pgs_alpha * (new_phi - old_phi);
        }

        history.push(action, outcome.observation);
        let next_belief = self.child_belief(action_node, outcome.observation);
        let future = if outcome.terminal {
            0.0
        } else {
            sim.discount() * self.simulate(sim, next_belief, state, history, depth - 1)
        };

        let total_return = reward + future;
        self.backup(action, action_node, belief_node, total_return);
        total_return
    }

    fn expand(&mut self, sim: &Sim, belief_node: NodeIndex, state: &Sim::State, history: &History) {
        for action in sim.pgs_legal(state, history, &self.ftable) {
            self.tree.add_action_child(belief_node, action);
        }
    }

    fn child_belief(&mut self, action_node: NodeIndex, observation: ObsIndex) -> NodeIndex {
        match self.tree.belief_child(action_node, observation) {
            Some(b) => b,
            None => self.tree.add_belief_child(action_node, observation),
        }
    }

    fn backup(&mut self, action: ActionIndex, action_node: NodeIndex, belief_node: NodeIndex, total_return: f64) {
        let old_q = self.tree.node(action_node).as_action().value;

        let a = self.tree.node_mut(action_node).as_action_mut();
        a.visits += 1;
        a.value += (total_return - a.value) / a.visits as f64;

        let b = self.tree.node_mut(belief_node).as_belief_mut();
        b.visits += 1;
        b.value += (total_return - b.value) / b.visits as f64;

        self.ftable.update(action, total_return, old_q);
    }

    /// Belief propagation after a real step (spec §4.3): filter particles
    /// consistent with the executed `(action, observation)`, and if too few
    /// survive, fill out the bag with `localMove`-perturbed transforms.
    pub fn update(
        &mut self,
        sim: &Sim,
        belief: &mut BeliefState<Sim::State>,
        history: &History,
        action: ActionIndex,
        observation: ObsIndex,
        terminal: bool,
    ) -> Update {
        if terminal {
            belief.clear();
            return Update::Terminal;
        }

        let source: Vec<Sim::State> = belief.iter().cloned().collect();
        let mut survivors = BeliefState::new();
        for particle in &source {
            let mut candidate = particle.clone();
            let outcome = sim.step(&mut candidate, action, &mut self.rng);
            if outcome.observation == observation {
                survivors.add(candidate);
            }
        }

        let target = self.params.num_transforms();
        if (survivors.size() as u64) < target && !source.is_empty() {
            let max_attempts = self.params.max_attempts();
            let mut attempts = 0u64;
            while (survivors.size() as u64) < target && attempts < max_attempts {
                attempts += 1;
                let seed = source[self.rng.uniform_index(source.len())].clone();
                let mut candidate = seed;
                if sim.local_move(&mut candidate, history, observation, &mut self.rng) {
                    survivors.add(candidate);
                }
            }
        }

        if survivors.is_empty() {
            *belief = survivors;
            return Update::OutOfParticles;
        }

        *belief = survivors;
        Update::NonTerminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::assembly::pomdp::AssemblyPomdp;

    fn params() -> PlannerParams {
        PlannerParams {
            sim_doubles: 6,
            transform_doubles: 1,
            transform_attempts: 4,
            timeout: Duration::from_secs(1),
            exploration_c: None,
            accuracy: 0.01,
            tree_knowledge: TreeKnowledge::Plain,
            rollout_knowledge: RolloutKnowledge::Preferred,
            pgs_alpha: 10.0,
        }
    }

    #[test]
    fn plan_returns_a_legal_action_from_the_empty_belief() {
        let sim = AssemblyPomdp::demo();
        let mut rng = Rng::from_seed(3);
        let mut planner = Planner::new(&sim, params(), FTable::new(-6.0, 1.0), rng.clone());
        let belief = BeliefState::new();
        let history = History::new();
        let action = planner.plan(&sim, &belief, &history);
        let start = sim.create_start_state(&mut rng);
        assert!(sim.legal(&start, &history).contains(&action) || action < sim.num_actions());
    }
}
