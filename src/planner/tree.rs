//! The POMCP search tree: alternating belief nodes and action nodes threaded
//! together by a `petgraph::DiGraph`, mirroring the teacher's
//! `Tree(Arc<DiGraph<Node, Edge>>, ...)` wrapper (`src/mccfr/tree.rs`) — here
//! specialised for two node kinds instead of one, since POMCP's tree alternates
//! "what do I believe" (belief node) and "what did I do" (action node) layers
//! (spec §4.3 "Tree shape").

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction::Outgoing;

use crate::belief::BeliefState;
use crate::simulator::{ActionIndex, ObsIndex};

/// Edge label: which action was taken (belief -> action) or which observation was
/// received (action -> belief).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Action(ActionIndex),
    Observation(ObsIndex),
}

pub struct BeliefNode<S> {
    pub value: f64,
    pub visits: u64,
    pub belief: BeliefState<S>,
}

impl<S> BeliefNode<S> {
    fn new() -> Self {
        Self {
            value: 0.0,
            visits: 0,
            belief: BeliefState::new(),
        }
    }
}

pub struct ActionNode {
    pub action: ActionIndex,
    pub value: f64,
    pub visits: u64,
}

pub enum Node<S> {
    Belief(BeliefNode<S>),
    Action(ActionNode),
}

impl<S> Node<S> {
    pub fn as_belief(&self) -> &BeliefNode<S> {
        match self {
            Node::Belief(b) => b,
            Node::Action(_) => unreachable!("expected a belief node"),
        }
    }
    pub fn as_belief_mut(&mut self) -> &mut BeliefNode<S> {
        match self {
            Node::Belief(b) => b,
            Node::Action(_) => unreachable!("expected a belief node"),
        }
    }
    pub fn as_action(&self) -> &ActionNode {
        match self {
            Node::Action(a) => a,
            Node::Belief(_) => unreachable!("expected an action node"),
        }
    }
    pub fn as_action_mut(&mut self) -> &mut ActionNode {
        match self {
            Node::Action(a) => a,
            Node::Belief(_) => unreachable!("expected an action node"),
        }
    }
}

/// Owns the tree's graph storage. The planner owns exactly one `Tree` per run
/// (spec §5: "within a run the tree is single-owner").
pub struct Tree<S> {
    graph: DiGraph<Node<S>, Edge>,
}

impl<S> Tree<S> {
    pub fn empty() -> Self {
        Self {
            graph: DiGraph::new(),
        }
    }

    /// Inserts a fresh, empty belief node (no children yet) and returns its index.
    pub fn add_belief(&mut self) -> NodeIndex {
        self.graph.add_node(Node::Belief(BeliefNode::new()))
    }

    pub fn add_action_child(&mut self, belief: NodeIndex, action: ActionIndex) -> NodeIndex {
        let node = self.graph.add_node(Node::Action(ActionNode {
            action,
            value: 0.0,
            visits: 0,
        }));
        self.graph.add_edge(belief, node, Edge::Action(action));
        node
    }

    pub fn add_belief_child(&mut self, action: NodeIndex, observation: ObsIndex) -> NodeIndex {
        let node = self.graph.add_node(Node::Belief(BeliefNode::new()));
        self.graph
            .add_edge(action, node, Edge::Observation(observation));
        node
    }

    pub fn node(&self, index: NodeIndex) -> &Node<S> {
        self.graph.node_weight(index).expect("valid node index")
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node<S> {
        self.graph
            .node_weight_mut(index)
            .expect("valid node index")
    }

    /// Action-node children of a belief node, in insertion order.
    pub fn action_children(&self, belief: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(belief, Outgoing)
            .map(|e| e.target())
            .collect()
    }

    /// The belief-node child of an action node reached by `observation`, if any.
    pub fn belief_child(&self, action: NodeIndex, observation: ObsIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(action, Outgoing)
            .find(|e| *e.weight() == Edge::Observation(observation))
            .map(|e| e.target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_children_preserve_insertion_order() {
        let mut tree: Tree<i32> = Tree::empty();
        let root = tree.add_belief();
        let a0 = tree.add_action_child(root, 0);
        let a1 = tree.add_action_child(root, 1);
        assert_eq!(tree.action_children(root), vec![a0, a1]);
    }

    #[test]
    fn belief_child_lookup_by_observation() {
        let mut tree: Tree<i32> = Tree::empty();
        let root = tree.add_belief();
        let action = tree.add_action_child(root, 0);
        let belief = tree.add_belief_child(action, 7);
        assert_eq!(tree.belief_child(action, 7), Some(belief));
        assert_eq!(tree.belief_child(action, 8), None);
    }
}
