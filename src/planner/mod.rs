//! The POMCP planner (spec §4.3): search tree, UCB1 selection, rollout
//! policies and the belief-propagation step that follows a real action.

pub mod pomcp;
pub mod rollout;
pub mod tree;
pub mod ucb;

pub use pomcp::{Planner, PlannerParams};
pub use rollout::RolloutKnowledge;

/// Whether in-tree backups include the PGS potential-based bonus (spec §4.3
/// "Reward shaping"), selected by the CLI's `--treeKnowledge` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKnowledge {
    Plain,
    Pgs,
}

impl TreeKnowledge {
    pub fn from_level(level: u32) -> Self {
        if level == 0 { TreeKnowledge::Plain } else { TreeKnowledge::Pgs }
    }
}

/// Outcome of a real (not simulated) decision step, reported to the harness
/// (spec §6 "Exit codes", §7 "Propagation": "the planner returns enum-like
/// status codes").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Terminal,
    NonTerminal,
    OutOfParticles,
}
