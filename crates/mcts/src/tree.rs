use std::collections::HashMap;

use zero_core::{Score, StateKey};

/// Statistics of one (state, action) edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Number of simulations that took this edge
    pub visit_count: u32,

    /// Running mean of backed-up values, from the perspective of the player
    /// choosing the action
    pub q_value: f32,
}

impl Edge {
    fn first(value: f32) -> Self {
        Self {
            visit_count: 1,
            q_value: value,
        }
    }

    fn update(&mut self, value: f32) {
        let n = self.visit_count as f32;
        self.q_value = (n * self.q_value + value) / (n + 1.0);
        self.visit_count += 1;
    }
}

/// Everything cached for one canonical state key.
///
/// A node is created the first time its key is checked for a terminal
/// outcome; it is expanded (prior, mask) on first visit by a simulation.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Cached game outcome for the player to move, `None` while running
    pub terminal_value: Option<f32>,

    /// Whether the oracle has been consulted for this state
    pub is_expanded: bool,

    /// Masked, normalised prior over the full action space
    pub prior: Vec<f32>,

    /// Legal-move mask snapshotted at expansion (refreshed on a rejected action)
    pub valid: Vec<f32>,

    /// Number of simulations that passed through this state after expansion
    pub visit_count: u32,

    /// Edge statistics for actions taken at least once
    pub edges: HashMap<usize, Edge>,
}

impl Node {
    fn unexpanded(terminal_value: Option<f32>) -> Self {
        Self {
            terminal_value,
            ..Self::default()
        }
    }

    pub fn edge(&self, action: usize) -> Option<&Edge> {
        self.edges.get(&action)
    }

    /// Visit count of every action, zero where the edge was never taken
    pub fn edge_counts(&self, action_space_size: usize) -> Vec<f32> {
        (0..action_space_size)
            .map(|a| self.edge(a).map_or(0.0, |e| e.visit_count as f32))
            .collect()
    }
}

/// Statistics store keyed by canonical state key.
///
/// Transpositions share a node: two histories reaching the same key read
/// and write the same statistics. Entries are never evicted individually.
/// A separate map caches final scores under non-canonical keys.
#[derive(Debug, Default)]
pub struct SearchTree {
    nodes: HashMap<StateKey, Node>,
    scores: HashMap<StateKey, Score>,
}

impl SearchTree {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &StateKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn is_expanded(&self, key: &StateKey) -> bool {
        self.nodes.get(key).is_some_and(|n| n.is_expanded)
    }

    /// Cached terminal check: `None` if the key was never checked,
    /// `Some(None)` if it was checked and the game is running.
    pub fn terminal_value(&self, key: &StateKey) -> Option<Option<f32>> {
        self.nodes.get(key).map(|n| n.terminal_value)
    }

    pub fn record_terminal(&mut self, key: StateKey, terminal_value: Option<f32>) {
        self.nodes
            .entry(key)
            .and_modify(|n| n.terminal_value = terminal_value)
            .or_insert_with(|| Node::unexpanded(terminal_value));
    }

    /// Seed a node with its prior and legal mask; the visit count starts at 0.
    pub fn initialize(&mut self, key: StateKey, prior: Vec<f32>, valid: Vec<f32>) {
        let node = self.nodes.entry(key).or_default();
        node.prior = prior;
        node.valid = valid;
        node.visit_count = 0;
        node.is_expanded = true;
    }

    /// Replace a stale legal-move mask
    pub fn refresh_mask(&mut self, key: &StateKey, valid: Vec<f32>) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.valid = valid;
        }
    }

    pub fn record_visit(&mut self, key: &StateKey) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.visit_count += 1;
        }
    }

    /// Fold `value` into the running mean of edge (key, action)
    pub fn record_edge(&mut self, key: &StateKey, action: usize, value: f32) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.edges
                .entry(action)
                .and_modify(|e| e.update(value))
                .or_insert_with(|| Edge::first(value));
        }
    }

    pub fn record_score(&mut self, key: StateKey, score: Score) {
        self.scores.insert(key, score);
    }

    /// Cached score under a non-canonical key
    pub fn score(&self, key: &StateKey) -> Option<Score> {
        self.scores.get(key).copied()
    }

    /// Number of state keys with cached statistics
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &Node)> {
        self.nodes.iter()
    }

    /// Drop every cached node and score
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.scores.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn key(s: &str) -> StateKey {
        StateKey::from(s)
    }

    #[test]
    fn test_terminal_check_creates_unexpanded_node() {
        let mut tree = SearchTree::new();
        assert_eq!(tree.terminal_value(&key("a")), None);

        tree.record_terminal(key("a"), None);
        tree.record_terminal(key("b"), Some(-1.0));

        assert_eq!(tree.terminal_value(&key("a")), Some(None));
        assert_eq!(tree.terminal_value(&key("b")), Some(Some(-1.0)));
        assert!(!tree.is_expanded(&key("a")));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_initialize_keeps_terminal_check() {
        let mut tree = SearchTree::new();
        tree.record_terminal(key("a"), None);
        tree.initialize(key("a"), vec![0.5, 0.5], vec![1.0, 1.0]);

        let node = tree.lookup(&key("a")).unwrap();
        assert!(node.is_expanded);
        assert_eq!(node.visit_count, 0);
        assert_eq!(node.terminal_value, None);
        assert_eq!(node.valid, vec![1.0, 1.0]);
    }

    #[test]
    fn test_record_edge_running_mean() {
        let mut tree = SearchTree::new();
        tree.initialize(key("a"), vec![1.0], vec![1.0]);

        tree.record_edge(&key("a"), 0, 1.0);
        tree.record_edge(&key("a"), 0, -1.0);
        tree.record_edge(&key("a"), 0, 0.5);

        let edge = tree.lookup(&key("a")).unwrap().edge(0).copied().unwrap();
        assert_eq!(edge.visit_count, 3);
        assert_relative_eq!(edge.q_value, 0.5 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_edge_counts_zero_for_unvisited() {
        let mut tree = SearchTree::new();
        tree.initialize(key("a"), vec![0.5, 0.0, 0.5], vec![1.0, 0.0, 1.0]);
        tree.record_edge(&key("a"), 2, 0.1);
        tree.record_edge(&key("a"), 2, 0.1);

        let counts = tree.lookup(&key("a")).unwrap().edge_counts(3);
        assert_eq!(counts, vec![0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_refresh_mask_replaces_valid() {
        let mut tree = SearchTree::new();
        tree.initialize(key("a"), vec![0.5, 0.5], vec![1.0, 1.0]);
        tree.refresh_mask(&key("a"), vec![0.0, 1.0]);
        assert_eq!(tree.lookup(&key("a")).unwrap().valid, vec![0.0, 1.0]);
    }

    #[test]
    fn test_scores_use_separate_key_space() {
        let mut tree = SearchTree::new();
        tree.record_score(key("a|B"), Score::new(3.0, 1.0));

        assert_eq!(tree.score(&key("a|B")), Some(Score::new(3.0, 1.0)));
        assert_eq!(tree.score(&key("a")), None);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut tree = SearchTree::new();
        tree.initialize(key("a"), vec![1.0], vec![1.0]);
        tree.record_score(key("a|B"), Score::default());
        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.score(&key("a|B")), None);
    }
}
