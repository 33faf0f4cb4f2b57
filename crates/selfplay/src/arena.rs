use anyhow::{Context, Result};
use log::info;
use zero_core::{Player, Rules, Score};
use zero_mcts::{Mcts, Oracle};

use crate::config::ArenaConfig;

/// A side in an arena match
pub trait ArenaPlayer<S> {
    /// Forget everything learned in earlier games
    fn reset(&mut self);

    /// Pick the move to play in `state`
    fn choose_action(&mut self, state: &S, simulations: u32) -> Result<usize>;

    /// Score of a finished game
    fn score(&mut self, state: &S) -> Option<Score>;
}

impl<'a, R: Rules, O: Oracle> ArenaPlayer<R::State> for Mcts<'a, R, O> {
    fn reset(&mut self) {
        Mcts::reset(self);
    }

    fn choose_action(&mut self, state: &R::State, simulations: u32) -> Result<usize> {
        let probs = self.action_probabilities(state, simulations, 0.0, false)?;
        probs
            .iter()
            .position(|&p| p == 1.0)
            .context("Greedy distribution has no chosen action")
    }

    fn score(&mut self, state: &R::State) -> Option<Score> {
        Mcts::score(self, state)
    }
}

/// Tally of an arena match, counted from the previous engine's side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaResult {
    pub previous_wins: u32,
    pub current_wins: u32,
    pub draws: u32,
}

impl ArenaResult {
    pub fn games(&self) -> u32 {
        self.previous_wins + self.current_wins + self.draws
    }
}

/// Play up to `num_games` games between the previous and current engines
///
/// The previous engine plays black in even-numbered games and white in odd
/// ones. Both engines are reset before every game. The match stops as soon
/// as either side reaches `num_games * acceptance_threshold` wins.
pub fn play_arena<R: Rules>(
    rules: &R,
    previous: &mut dyn ArenaPlayer<R::State>,
    current: &mut dyn ArenaPlayer<R::State>,
    config: &ArenaConfig,
) -> Result<ArenaResult> {
    let threshold = config.num_games as f32 * config.acceptance_threshold;
    let mut result = ArenaResult::default();

    for game in 0..config.num_games {
        let previous_is_black = game % 2 == 0;
        let (black_value, score) = if previous_is_black {
            play_one(rules, &mut *previous, &mut *current, config.simulations)?
        } else {
            play_one(rules, &mut *current, &mut *previous, config.simulations)?
        };

        let previous_value = if previous_is_black {
            black_value
        } else {
            -black_value
        };
        if previous_value > 0.0 {
            result.previous_wins += 1;
        } else if previous_value < 0.0 {
            result.current_wins += 1;
        } else {
            result.draws += 1;
        }

        info!(
            "Arena game {}/{}: score {:?}, previous {} / current {} / draws {}",
            game + 1,
            config.num_games,
            score,
            result.previous_wins,
            result.current_wins,
            result.draws
        );

        if result.previous_wins as f32 >= threshold || result.current_wins as f32 >= threshold {
            break;
        }
    }

    Ok(result)
}

/// Play one game, returning the outcome from black's perspective
fn play_one<'a, R: Rules>(
    rules: &R,
    black: &'a mut dyn ArenaPlayer<R::State>,
    white: &'a mut dyn ArenaPlayer<R::State>,
    simulations: u32,
) -> Result<(f32, Option<Score>)> {
    black.reset();
    white.reset();

    let mut state = rules.initial_state();
    let outcome = loop {
        if let Some(outcome) = rules.terminal_outcome(&state) {
            break outcome;
        }
        let mover = match rules.current_player(&state) {
            Player::Black => &mut *black,
            Player::White => &mut *white,
        };
        let action = mover.choose_action(&state, simulations)?;
        state = rules.apply(&state, action)?;
    };

    let black_value = outcome.value * rules.current_player(&state).sign();
    Ok((black_value, black.score(&state)))
}
