use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use zero_core::Rules;
use zero_mcts::{Mcts, MctsConfig, Oracle};

use crate::config::SelfPlayConfig;
use crate::data::{GameRecord, RecordedPosition, TrainingExample};

/// Play a single self-play game
///
/// One engine (and so one search tree) serves the whole game. Each turn
/// flips a coin weighted by `full_search_probability`: full searches use
/// root noise and are recorded, fast searches only pick the move.
///
/// # Arguments
/// * `rules` - Game rules
/// * `oracle` - Policy/value oracle used by the search
/// * `mcts_config` - Search configuration
/// * `config` - Self-play driver configuration
pub fn play_game<R: Rules, O: Oracle>(
    rules: &R,
    oracle: &O,
    mcts_config: MctsConfig,
    config: &SelfPlayConfig,
) -> Result<GameRecord> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut mcts = Mcts::new(rules, oracle, mcts_config);
    let mut record = GameRecord::new();
    let mut state = rules.initial_state();
    let mut turn = 0u32;

    let outcome = loop {
        if let Some(outcome) = rules.terminal_outcome(&state) {
            break outcome;
        }
        turn += 1;

        let temp = if turn < config.temperature_threshold { 1.0 } else { 0.0 };
        let full_search = rng.gen::<f32>() < config.full_search_probability;
        let simulations = if full_search {
            config.full_search_simulations
        } else {
            config.fast_search_simulations
        };

        let probs = mcts.action_probabilities(&state, simulations, temp, full_search)?;
        let action = if temp > 0.0 {
            WeightedIndex::new(&probs)
                .map_err(|e| anyhow!("Bad move distribution: {e}"))?
                .sample(&mut rng)
        } else {
            probs
                .iter()
                .position(|&p| p == 1.0)
                .context("Greedy distribution has no chosen action")?
        };
        debug!(
            "turn {turn}: action {action} ({} search, {simulations} sims)",
            if full_search { "full" } else { "fast" }
        );

        if full_search {
            let player = rules.current_player(&state);
            let canonical = rules.canonical_form(&state, player);
            let mut policy = vec![0.0; rules.action_space_size()];
            policy[action] = 1.0;
            record.positions.push(RecordedPosition {
                history: rules.canonical_history(&canonical),
                player,
                policy,
            });
        }

        state = rules
            .apply(&state, action)
            .with_context(|| format!("Move failed on turn {turn}"))?;
        record.moves.push(action);
    };

    let score = mcts.score(&state);
    record.finish(outcome.value, rules.current_player(&state), score);

    let counters = mcts.counters();
    info!(
        "Self-play game finished: {:?} after {} moves, {} recorded positions, {} simulations ({} abandoned)",
        record.winner,
        record.len(),
        record.positions.len(),
        counters.simulations,
        counters.abandoned
    );

    Ok(record)
}

/// Convert game record to training examples
///
/// Every recorded position yields one example per board symmetry, with the
/// final outcome seen from the player who was to move there.
pub fn game_to_training_examples<R: Rules>(rules: &R, record: &GameRecord) -> Vec<TrainingExample> {
    record
        .positions
        .iter()
        .flat_map(|position| {
            let value = record.value_for(position.player);
            rules
                .symmetries(&position.history, &position.policy)
                .into_iter()
                .map(move |(history, policy)| TrainingExample::new(history, policy, value))
        })
        .collect()
}
