//! UCB1 selection (spec §4.3 "Selection (UCB1)").

use petgraph::graph::NodeIndex;

use crate::planner::tree::Tree;
use crate::random::Rng;

/// Picks the action-node child of `belief` maximising
/// `Q(s,a) + c*sqrt(ln N(s) / n(s,a))`, trying unvisited actions first in
/// arbitrary order, and breaking ties uniformly at random.
pub fn select<S>(tree: &Tree<S>, belief: NodeIndex, exploration_c: f64, rng: &mut Rng) -> NodeIndex {
    let children = tree.action_children(belief);
    assert!(
        !children.is_empty(),
        "UCB selection at a belief node with no legal actions"
    );

    let parent_visits = tree.node(belief).as_belief().visits;

    let unvisited: Vec<NodeIndex> = children
        .iter()
        .copied()
        .filter(|&c| tree.node(c).as_action().visits == 0)
        .collect();
    if !unvisited.is_empty() {
        return *rng.choose(&unvisited);
    }

    let log_n = (parent_visits.max(1) as f64).ln();
    let mut best_score = f64::NEG_INFINITY;
    let mut best: Vec<NodeIndex> = Vec::new();
    for &child in &children {
        let action = tree.node(child).as_action();
        let bonus = exploration_c * (log_n / action.visits as f64).sqrt();
        let score = action.value + bonus;
        if score > best_score + 1e-12 {
            best_score = score;
            best.clear();
            best.push(child);
        } else if (score - best_score).abs() <= 1e-12 {
            best.push(child);
        }
    }
    *rng.choose(&best)
}

/// Greedy (exploitation-only) pick among a belief node's action children, used
/// to recommend the final action once simulation budget is exhausted (spec §5:
/// "the best action (by visit-count-weighted value) is returned").
pub fn best_action<S>(tree: &Tree<S>, belief: NodeIndex) -> NodeIndex {
    let children = tree.action_children(belief);
    assert!(!children.is_empty(), "no legal actions at root belief node");
    children
        .into_iter()
        .max_by(|&a, &b| {
            let a = tree.node(a).as_action();
            let b = tree.node(b).as_action();
            (a.visits, ordered_float(a.value)).cmp(&(b.visits, ordered_float(b.value)))
        })
        .unwrap()
}

fn ordered_float(x: f64) -> i64 {
    (x * 1e9) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unvisited_actions_are_tried_first() {
        let mut tree: crate::planner::tree::Tree<i32> = crate::planner::tree::Tree::empty();
        let root = tree.add_belief();
        tree.node_mut(root).as_belief_mut().visits = 10;
        let a0 = tree.add_action_child(root, 0);
        let a1 = tree.add_action_child(root, 1);
        tree.node_mut(a0).as_action_mut().visits = 5;
        tree.node_mut(a0).as_action_mut().value = 2.0;
        // a1 remains unvisited and must be selected regardless of a0's score.
        let mut rng = Rng::from_seed(0);
        let chosen = select(&tree, root, 1.0, &mut rng);
        assert_eq!(chosen, a1);
    }
}
