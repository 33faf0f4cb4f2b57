use log::{debug, error, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use zero_core::{Rules, Score, StateKey, Symmetry};

use crate::backup::backup;
use crate::config::MctsConfig;
use crate::counters::SearchCounters;
use crate::dirichlet::RootNoise;
use crate::distribution::{visit_distribution, Diagnostics, Violation};
use crate::error::{MctsError, Result};
use crate::evaluation::Oracle;
use crate::expansion::{evaluate_leaf, mask_prior};
use crate::selection::select_action;
use crate::tree::SearchTree;

/// Selection attempts per node: the cached mask, then one refreshed mask
const SELECTION_ATTEMPTS: usize = 2;

/// Monte Carlo Tree Search guided by a policy/value oracle (PUCT)
///
/// Statistics persist across calls so a driver can reuse the tree between
/// successive moves of one game; call [`Mcts::reset`] between games.
/// Single-threaded: every simulation runs to completion before the next.
pub struct Mcts<'a, R: Rules, O: Oracle> {
    rules: &'a R,
    oracle: &'a O,
    config: MctsConfig,
    tree: SearchTree,
    rng: StdRng,
    counters: SearchCounters,
    /// Canonical root of the last `run_simulations` call
    root: Option<R::State>,
    /// Self-play mode for the current batch: Dirichlet noise at the root
    root_noise: bool,
}

impl<'a, R: Rules, O: Oracle> Mcts<'a, R, O> {
    /// Create a new MCTS instance
    pub fn new(rules: &'a R, oracle: &'a O, config: MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            rules,
            oracle,
            config,
            tree: SearchTree::new(),
            rng,
            counters: SearchCounters::default(),
            root: None,
            root_noise: false,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Run `count` simulations from `root`.
    ///
    /// `root_noise` selects self-play mode: the root prior is blended with
    /// freshly sampled Dirichlet noise on every simulation.
    pub fn run_simulations(&mut self, root: &R::State, count: u32, root_noise: bool) -> Result<()> {
        self.root_noise = root_noise;

        for _ in 0..count {
            self.counters.simulations += 1;
            self.simulate(root, 1, true)?;
        }

        self.root = Some(self.rules.canonical_form(root, self.rules.current_player(root)));
        Ok(())
    }

    /// Run simulations and derive the move distribution in one go
    pub fn action_probabilities(
        &mut self,
        root: &R::State,
        count: u32,
        temp: f32,
        root_noise: bool,
    ) -> Result<Vec<f32>> {
        self.run_simulations(root, count, root_noise)?;
        self.derive_distribution(temp)
    }

    /// Move distribution at the root of the last `run_simulations` call.
    ///
    /// `temp == 0` gives a one-hot vector on the most visited legal action,
    /// otherwise probabilities proportional to visits^(1/temp). Illegal
    /// actions always get exactly 0.
    pub fn derive_distribution(&self, temp: f32) -> Result<Vec<f32>> {
        let root = self.root.as_ref().ok_or(MctsError::RootNotInitialized)?;
        let key = self.rules.state_key(root, true);
        let valid = self.rules.legal_moves(root);
        if valid.iter().all(|&v| v == 0.0) {
            return Err(MctsError::NoLegalMoves);
        }
        let counts = match self.tree.lookup(&key) {
            Some(node) => node.edge_counts(self.rules.action_space_size()),
            None => vec![0.0; self.rules.action_space_size()],
        };

        match visit_distribution(&counts, &valid, temp) {
            Ok(probs) => Ok(probs),
            Err(violation) => Err(self.invariant_violation(&key, violation, counts, valid)),
        }
    }

    /// Score cached under the state's non-canonical key during terminal checks
    pub fn check_score_cache(&self, state: &R::State) -> Option<Score> {
        self.tree.score(&self.rules.state_key(state, false))
    }

    /// Score of a finished game, from the cache when possible.
    ///
    /// `None` if the game is still running.
    pub fn score(&mut self, state: &R::State) -> Option<Score> {
        if let Some(score) = self.check_score_cache(state) {
            return Some(score);
        }
        let outcome = self.rules.terminal_outcome(state)?;
        self.tree
            .record_score(self.rules.state_key(state, false), outcome.score);
        Some(outcome.score)
    }

    /// Clear every cached statistic. Must not be called mid-batch.
    pub fn reset(&mut self) {
        self.tree.clear();
        self.root = None;
        self.counters = SearchCounters::default();
    }

    pub fn counters(&self) -> SearchCounters {
        self.counters
    }

    /// Read-only view of the statistics store
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Number of state keys with cached statistics
    pub fn tree_size(&self) -> usize {
        self.tree.len()
    }

    /// One depth-first simulation from `state`.
    ///
    /// Statistics are keyed by the canonical form while moves are played on
    /// the real state, so terminal scores are cached for the real position.
    /// Returns the value of `state` negated, i.e. from the perspective of
    /// the player who moved into it. `None` means the simulation was
    /// abandoned and nothing on its path was updated.
    fn simulate(&mut self, state: &R::State, depth: u32, is_root: bool) -> Result<Option<f32>> {
        let canonical = self
            .rules
            .canonical_form(state, self.rules.current_player(state));
        let key = self.rules.state_key(&canonical, true);

        if let Some(outcome) = self.check_terminal(&key, state) {
            return Ok(Some(-outcome));
        }

        if depth > self.config.max_depth {
            self.counters.depth_cutoffs += 1;
            debug!("Depth limit {} reached at {}", self.config.max_depth, key);
            return Ok(Some(self.config.depth_limit_value));
        }

        if !self.tree.is_expanded(&key) {
            return self.expand(key, &canonical).map(Some);
        }

        let Some((action, next)) = self.select_and_apply(&key, &canonical, state, is_root)? else {
            self.counters.abandoned += 1;
            debug!("No playable action at {}, abandoning simulation", key);
            return Ok(None);
        };

        let Some(value) = self.simulate(&next, depth + 1, false)? else {
            return Ok(None);
        };

        backup(&mut self.tree, &key, action, value);
        Ok(Some(-value))
    }

    /// Terminal value of `state` for the player to move, computed once per
    /// canonical key. The score of the real `state` is cached alongside
    /// under its non-canonical key.
    fn check_terminal(&mut self, key: &StateKey, state: &R::State) -> Option<f32> {
        if let Some(cached) = self.tree.terminal_value(key) {
            if cached.is_some() {
                // a colour-flipped twin may have filled the terminal cache
                self.score(state);
            }
            return cached;
        }

        let outcome = self.rules.terminal_outcome(state);
        if let Some(outcome) = &outcome {
            self.tree
                .record_score(self.rules.state_key(state, false), outcome.score);
        }

        let value = outcome.map(|o| o.value);
        self.tree.record_terminal(key.clone(), value);
        value
    }

    /// First visit: consult the oracle and seed the node.
    fn expand(&mut self, key: StateKey, state: &R::State) -> Result<f32> {
        let history = self.rules.canonical_history(state);
        let symmetry = if self.config.random_symmetry {
            Some(Symmetry::from_index(self.rng.gen_range(0..8)))
        } else {
            None
        };

        self.counters.oracle_calls += 1;
        let (raw, value) =
            evaluate_leaf(self.oracle, &history, self.rules.action_space_size(), symmetry)?;

        let valid = self.rules.legal_moves(state);
        let (prior, degenerate) = mask_prior(&raw, &valid);
        if degenerate {
            // Many of these point at an undertrained or overfitted oracle
            self.counters.degenerate_priors += 1;
            warn!("All valid moves were masked at {}, using a uniform prior", key);
        }

        self.tree.initialize(key, prior, valid);
        Ok(-value)
    }

    /// PUCT selection on the canonical node followed by the transition of
    /// the real `state`, retried once with a refreshed legal mask if the
    /// rules reject the chosen action.
    fn select_and_apply(
        &mut self,
        key: &StateKey,
        canonical: &R::State,
        state: &R::State,
        is_root: bool,
    ) -> Result<Option<(usize, R::State)>> {
        for attempt in 0..SELECTION_ATTEMPTS {
            if attempt > 0 {
                self.counters.mask_refreshes += 1;
                warn!("Cached legal moves at {} disagree with the rules, refreshing", key);
                self.tree.refresh_mask(key, self.rules.legal_moves(canonical));
            }

            let noise = if is_root && self.root_noise {
                Some(self.sample_root_noise(key)?)
            } else {
                None
            };

            let Some(node) = self.tree.lookup(key) else {
                return Ok(None);
            };
            let Some(action) = select_action(node, self.config.c_puct, noise.as_ref()) else {
                continue;
            };

            match self.rules.apply(state, action) {
                Ok(next) => return Ok(Some((action, next))),
                Err(err) => debug!("Rules rejected selection at {}: {}", key, err),
            }
        }

        Ok(None)
    }

    fn sample_root_noise(&mut self, key: &StateKey) -> Result<RootNoise> {
        let legal = self
            .tree
            .lookup(key)
            .map_or(0, |n| self.rules.legal_action_indices(&n.valid).len());
        let noise = RootNoise::sample(
            &mut self.rng,
            legal,
            self.config.dirichlet_alpha,
            self.config.dirichlet_epsilon,
        )?;
        debug_assert_eq!(noise.len(), legal);
        Ok(noise)
    }

    fn invariant_violation(
        &self,
        key: &StateKey,
        violation: Violation,
        counts: Vec<f32>,
        valid: Vec<f32>,
    ) -> MctsError {
        let node = self.tree.lookup(key);
        let mut edges: Vec<(usize, u32, f32)> = node
            .map(|n| {
                n.edges
                    .iter()
                    .map(|(&a, e)| (a, e.visit_count, e.q_value))
                    .collect()
            })
            .unwrap_or_default();
        edges.sort_by_key(|&(a, _, _)| a);

        let diagnostics = Diagnostics {
            reason: violation.to_string(),
            state: key.to_string(),
            valid,
            counts,
            prior: node.filter(|n| n.is_expanded).map(|n| n.prior.clone()),
            edges,
        };
        error!("Search statistics out of sync with legal moves: {:?}", diagnostics);
        MctsError::InvariantViolation(Box::new(diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::UniformOracle;
    use zero_core::TicTacToe;

    fn engine<'a>(game: &'a TicTacToe, oracle: &'a UniformOracle) -> Mcts<'a, TicTacToe, UniformOracle> {
        Mcts::new(game, oracle, MctsConfig::default().with_seed(0))
    }

    #[test]
    fn test_mcts_creation() {
        let game = TicTacToe::new();
        let oracle = UniformOracle::new(9);
        let mcts = engine(&game, &oracle);
        assert_eq!(mcts.tree_size(), 0);
        assert_eq!(mcts.counters(), SearchCounters::default());
    }

    #[test]
    fn test_derive_before_search_is_error() {
        let game = TicTacToe::new();
        let oracle = UniformOracle::new(9);
        let mcts = engine(&game, &oracle);
        assert!(matches!(
            mcts.derive_distribution(1.0),
            Err(MctsError::RootNotInitialized)
        ));
    }

    #[test]
    fn test_first_simulation_only_expands_root() {
        let game = TicTacToe::new();
        let oracle = UniformOracle::new(9);
        let mut mcts = engine(&game, &oracle);

        mcts.run_simulations(&game.initial_state(), 1, false).unwrap();

        let key = game.state_key(&game.initial_state(), true);
        let root = mcts.tree().lookup(&key).unwrap();
        assert!(root.is_expanded);
        assert_eq!(root.visit_count, 0);
        assert!(root.edges.is_empty());
        assert_eq!(mcts.counters().oracle_calls, 1);
    }

    #[test]
    fn test_uniform_prior_ties_break_to_lowest_index() {
        let game = TicTacToe::new();
        let oracle = UniformOracle::new(9);
        let mut mcts = engine(&game, &oracle);

        mcts.run_simulations(&game.initial_state(), 2, false).unwrap();

        let key = game.state_key(&game.initial_state(), true);
        let root = mcts.tree().lookup(&key).unwrap();
        assert_eq!(root.visit_count, 1);
        assert_eq!(root.edge(0).unwrap().visit_count, 1);
    }

    #[test]
    fn test_terminal_root_returns_negated_outcome_without_visits() {
        let game = TicTacToe::new();
        let oracle = UniformOracle::new(9);
        let mut mcts = engine(&game, &oracle);
        // Black has completed the top row; White to move has lost
        let finished = game.play(&[0, 3, 1, 4, 2]).unwrap();
        let canonical = game.canonical_form(&finished, game.current_player(&finished));

        assert_eq!(mcts.simulate(&finished, 1, true).unwrap(), Some(1.0));

        let node = mcts.tree().lookup(&game.state_key(&canonical, true)).unwrap();
        assert!(!node.is_expanded);
        assert_eq!(node.visit_count, 0);
        assert_eq!(mcts.counters().oracle_calls, 0);
        // scored on the real board, not the colour-flipped one
        assert_eq!(mcts.check_score_cache(&finished), Some(Score::new(1.0, 0.0)));
        assert_eq!(mcts.check_score_cache(&canonical), None);
    }

    #[test]
    fn test_derive_on_terminal_root_reports_no_legal_moves() {
        let game = TicTacToe::new();
        let oracle = UniformOracle::new(9);
        let mut mcts = engine(&game, &oracle);
        let finished = game.play(&[0, 3, 1, 4, 2]).unwrap();

        mcts.run_simulations(&finished, 3, false).unwrap();

        assert!(matches!(
            mcts.derive_distribution(0.0),
            Err(MctsError::NoLegalMoves)
        ));
        assert!(matches!(
            mcts.derive_distribution(1.0),
            Err(MctsError::NoLegalMoves)
        ));
    }

    #[test]
    fn test_expansion_returns_negated_oracle_value() {
        struct Confident;

        impl Oracle for Confident {
            fn evaluate(&self, _history: &zero_core::HistoryPlanes) -> Result<(Vec<f32>, f32)> {
                Ok((vec![1.0 / 9.0; 9], 0.4))
            }
        }

        let game = TicTacToe::new();
        let mut mcts = Mcts::new(&game, &Confident, MctsConfig::default().with_seed(0));

        assert_eq!(mcts.simulate(&game.initial_state(), 1, true).unwrap(), Some(-0.4));
        let key = game.state_key(&game.initial_state(), true);
        assert!(mcts.tree().is_expanded(&key));
    }

    #[test]
    fn test_win_one_ply_deep_propagates_to_root() {
        let game = TicTacToe::new();
        let oracle = UniformOracle::new(9);
        let mut mcts = engine(&game, &oracle);
        // Black to move, cell 2 (the first legal cell) wins
        let root = game.play(&[0, 3, 1, 4]).unwrap();

        // expansion: neutral oracle value
        assert_eq!(mcts.simulate(&root, 1, true).unwrap(), Some(-0.0));
        // the winning child is worth +1 to Black, so the root call sees -1
        assert_eq!(mcts.simulate(&root, 1, true).unwrap(), Some(-1.0));

        let node = mcts.tree().lookup(&game.state_key(&root, true)).unwrap();
        assert_eq!(node.visit_count, 1);
        assert_eq!(node.edge(2).unwrap().q_value, 1.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let game = TicTacToe::new();
        let oracle = UniformOracle::new(9);
        let mut mcts = engine(&game, &oracle);

        mcts.run_simulations(&game.initial_state(), 10, false).unwrap();
        assert!(mcts.tree_size() > 0);

        mcts.reset();
        assert_eq!(mcts.tree_size(), 0);
        assert_eq!(mcts.counters().simulations, 0);
        assert!(mcts.derive_distribution(1.0).is_err());
    }

    #[test]
    fn test_score_computed_on_miss_then_cached() {
        let game = TicTacToe::new();
        let oracle = UniformOracle::new(9);
        let mut mcts = engine(&game, &oracle);
        let finished = game.play(&[0, 3, 1, 4, 2]).unwrap();

        assert_eq!(mcts.check_score_cache(&finished), None);
        assert_eq!(mcts.score(&finished), Some(Score::new(1.0, 0.0)));
        assert_eq!(mcts.check_score_cache(&finished), Some(Score::new(1.0, 0.0)));
        assert_eq!(mcts.score(&game.initial_state()), None);
    }
}
