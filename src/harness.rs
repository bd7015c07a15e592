//! Experiment harness (spec §2 "Experiment harness", §6 "Exit codes"): steps
//! one episode until terminal or particle depletion, driving the `Planner`
//! against a `Simulator` with no external perception/manipulation services —
//! the simulator itself stands in for those abstract RPCs (§1 "Out of scope").

use crate::belief::BeliefState;
use crate::history::History;
use crate::planner::{Planner, PlannerParams, Update};
use crate::random::{Rng, RunningStats};
use crate::simulator::{Reward, Simulator};

/// One episode's outcome: the undiscounted return, step count, and how the
/// episode ended (mirrors `Update`, plus a synthetic `MaxSteps` case when the
/// harness's own step cap is hit before either).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EpisodeEnd {
    Terminal,
    OutOfParticles,
    MaxSteps,
}

#[derive(Debug, Clone, Copy)]
pub struct EpisodeResult {
    pub total_reward: Reward,
    pub steps: u32,
    pub end: EpisodeEnd,
}

/// Runs one episode: repeatedly asks the planner for the best action, steps
/// the simulator as the stand-in for the real perception/manipulation
/// services, and feeds the real observation back for belief propagation.
pub fn run_episode<Sim: Simulator>(
    sim: &Sim,
    planner: &mut Planner<Sim>,
    rng: &mut Rng,
    max_steps: u32,
) -> EpisodeResult {
    let mut belief = BeliefState::new();
    let mut history = History::new();
    let mut total_reward = 0.0;
    let mut state = sim.create_start_state(rng);
    belief.add(state.clone());

    for step in 0..max_steps {
        let action = planner.plan(sim, &belief, &history);
        let outcome = sim.step(&mut state, action, rng);
        total_reward += outcome.reward;
        history.push(action, outcome.observation);

        log::debug!(
            "step {step}: action={action} observation={} reward={:.3} terminal={}",
            outcome.observation,
            outcome.reward,
            outcome.terminal
        );

        let update = planner.update(sim, &mut belief, &history, action, outcome.observation, outcome.terminal);
        match update {
            Update::Terminal => {
                return EpisodeResult { total_reward, steps: step + 1, end: EpisodeEnd::Terminal };
            }
            Update::OutOfParticles => {
                log::warn!("belief exhausted after {} particles filtered", belief.size());
                return EpisodeResult { total_reward, steps: step + 1, end: EpisodeEnd::OutOfParticles };
            }
            Update::NonTerminal => {}
        }
    }

    EpisodeResult { total_reward, steps: max_steps, end: EpisodeEnd::MaxSteps }
}

/// Runs `runs` independent episodes and aggregates their returns (spec §2
/// "Experiment harness"), using a fresh seed per run derived from `base_seed`
/// so the whole batch is reproducible.
pub fn run_batch<Sim: Simulator>(
    sim: &Sim,
    planner_params: PlannerParams,
    ftable_activation: f64,
    ftable_transition_rate: f64,
    runs: u32,
    max_steps: u32,
    base_seed: u64,
) -> (RunningStats, Vec<EpisodeResult>) {
    let mut stats = RunningStats::new();
    let mut results = Vec::with_capacity(runs as usize);
    for run in 0..runs {
        let mut rng = Rng::from_seed(base_seed.wrapping_add(run as u64));
        let ftable = crate::ftable::FTable::new(ftable_activation, ftable_transition_rate);
        let mut planner = Planner::new(sim, planner_params.clone(), ftable, rng.clone());
        let result = run_episode(sim, &mut planner, &mut rng, max_steps);
        log::info!("run {run}: return={:.3} steps={} end={:?}", result.total_reward, result.steps, result.end);
        stats.push(result.total_reward);
        results.push(result);
    }
    (stats, results)
}

/// Parallel variant of [`run_batch`] (spec §5: "the outer loop may be
/// parallelized across independent runs"): each run owns its own `Planner`,
/// `FTable` and `Rng`, so runs share no mutable state and can be dispatched
/// across a rayon thread pool without synchronization.
#[cfg(feature = "parallel-runs")]
pub fn run_batch_parallel<Sim>(
    sim: &Sim,
    planner_params: PlannerParams,
    ftable_activation: f64,
    ftable_transition_rate: f64,
    runs: u32,
    max_steps: u32,
    base_seed: u64,
) -> (RunningStats, Vec<EpisodeResult>)
where
    Sim: Simulator + Sync,
    Sim::State: Send,
{
    use rayon::prelude::*;

    let results: Vec<EpisodeResult> = (0..runs)
        .into_par_iter()
        .map(|run| {
            let mut rng = Rng::from_seed(base_seed.wrapping_add(run as u64));
            let ftable = crate::ftable::FTable::new(ftable_activation, ftable_transition_rate);
            let mut planner = Planner::new(sim, planner_params.clone(), ftable, rng.clone());
            let result = run_episode(sim, &mut planner, &mut rng, max_steps);
            log::info!("run {run}: return={:.3} steps={} end={:?}", result.total_reward, result.steps, result.end);
            result
        })
        .collect();

    let mut stats = RunningStats::new();
    for result in &results {
        stats.push(result.total_reward);
    }
    (stats, results)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domains::assembly::pomdp::AssemblyPomdp;
    use crate::ftable::FTable;
    use crate::planner::{RolloutKnowledge, TreeKnowledge};

    fn params() -> PlannerParams {
        PlannerParams {
            sim_doubles: 5,
            transform_doubles: 1,
            transform_attempts: 4,
            timeout: Duration::from_millis(200),
            exploration_c: None,
            accuracy: 0.01,
            tree_knowledge: TreeKnowledge::Pgs,
            rollout_knowledge: RolloutKnowledge::Pgs,
            pgs_alpha: 10.0,
        }
    }

    #[test]
    fn episode_ends_with_a_definite_outcome() {
        let sim = AssemblyPomdp::demo();
        let mut rng = Rng::from_seed(9);
        let mut planner = Planner::new(&sim, params(), FTable::new(-6.0, 1.0), rng.clone());
        let result = run_episode(&sim, &mut planner, &mut rng, 40);
        assert!(result.steps > 0);
        assert!(result.total_reward.is_finite());
    }

    #[test]
    fn batch_aggregates_every_run() {
        let sim = AssemblyPomdp::demo();
        let (stats, results) = run_batch(&sim, params(), -6.0, 1.0, 3, 30, 1);
        assert_eq!(stats.count(), 3);
        assert_eq!(results.len(), 3);
    }
}
