use crate::planes::HistoryPlanes;
use crate::rules::{IllegalAction, Outcome, Player, Rules, Score, StateKey};

const SIZE: usize = 3;
const CELLS: usize = SIZE * SIZE;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Position of a tic-tac-toe game.
///
/// Cells hold `1` for Black, `-1` for White and `0` when empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicTacToeState {
    cells: [i8; CELLS],
    to_move: Player,
}

impl TicTacToeState {
    pub fn cells(&self) -> &[i8; CELLS] {
        &self.cells
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    fn winner(&self) -> Option<Player> {
        LINES.iter().find_map(|line| {
            let sum: i8 = line.iter().map(|&i| self.cells[i]).sum();
            match sum {
                3 => Some(Player::Black),
                -3 => Some(Player::White),
                _ => None,
            }
        })
    }

    fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != 0)
    }
}

/// Reference rules engine: 3x3 noughts and crosses, nine actions, no pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl TicTacToe {
    pub fn new() -> Self {
        Self
    }

    /// Play `moves` in order from the empty board.
    pub fn play(&self, moves: &[usize]) -> Result<TicTacToeState, IllegalAction> {
        moves
            .iter()
            .try_fold(self.initial_state(), |state, &m| self.apply(&state, m))
    }
}

impl Rules for TicTacToe {
    type State = TicTacToeState;

    fn initial_state(&self) -> TicTacToeState {
        TicTacToeState {
            cells: [0; CELLS],
            to_move: Player::Black,
        }
    }

    fn action_space_size(&self) -> usize {
        CELLS
    }

    fn legal_moves(&self, state: &TicTacToeState) -> Vec<f32> {
        if self.terminal_outcome(state).is_some() {
            return vec![0.0; CELLS];
        }
        state
            .cells
            .iter()
            .map(|&c| if c == 0 { 1.0 } else { 0.0 })
            .collect()
    }

    fn apply(&self, state: &TicTacToeState, action: usize) -> Result<TicTacToeState, IllegalAction> {
        if action >= CELLS || state.cells[action] != 0 || self.terminal_outcome(state).is_some() {
            return Err(IllegalAction { action });
        }
        let mut next = state.clone();
        next.cells[action] = state.to_move.sign() as i8;
        next.to_move = state.to_move.opponent();
        Ok(next)
    }

    fn current_player(&self, state: &TicTacToeState) -> Player {
        state.to_move
    }

    fn canonical_form(&self, state: &TicTacToeState, player: Player) -> TicTacToeState {
        match player {
            Player::Black => state.clone(),
            Player::White => TicTacToeState {
                cells: state.cells.map(|c| -c),
                to_move: state.to_move.opponent(),
            },
        }
    }

    fn canonical_history(&self, state: &TicTacToeState) -> HistoryPlanes {
        let mover = state.to_move.sign() as i8;
        let mut planes = HistoryPlanes::zeros(2, SIZE);
        for (i, &c) in state.cells.iter().enumerate() {
            if c == 0 {
                continue;
            }
            let plane = if c == mover { 0 } else { 1 };
            planes.set(plane, i / SIZE, i % SIZE, 1.0);
        }
        planes
    }

    fn state_key(&self, state: &TicTacToeState, canonical: bool) -> StateKey {
        let mut key: String = state
            .cells
            .iter()
            .map(|&c| match c {
                1 => 'x',
                -1 => 'o',
                _ => '.',
            })
            .collect();
        if !canonical {
            key.push(match state.to_move {
                Player::Black => 'B',
                Player::White => 'W',
            });
        }
        StateKey::from(key)
    }

    fn terminal_outcome(&self, state: &TicTacToeState) -> Option<Outcome> {
        match state.winner() {
            Some(winner) => {
                let score = match winner {
                    Player::Black => Score::new(1.0, 0.0),
                    Player::White => Score::new(0.0, 1.0),
                };
                let value = if winner == state.to_move { 1.0 } else { -1.0 };
                Some(Outcome { value, score })
            }
            None if state.is_full() => Some(Outcome {
                value: 0.0,
                score: Score::new(0.5, 0.5),
            }),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_state_all_moves_legal() {
        let game = TicTacToe::new();
        let state = game.initial_state();
        assert_eq!(game.legal_moves(&state), vec![1.0; 9]);
        assert_eq!(game.current_player(&state), Player::Black);
        assert!(game.terminal_outcome(&state).is_none());
    }

    #[test]
    fn test_occupied_cell_is_illegal() {
        let game = TicTacToe::new();
        let state = game.play(&[4]).unwrap();
        assert_eq!(game.apply(&state, 4), Err(IllegalAction { action: 4 }));
        assert_eq!(game.apply(&state, 9), Err(IllegalAction { action: 9 }));
        assert_eq!(game.legal_moves(&state)[4], 0.0);
    }

    #[test]
    fn test_win_is_loss_for_player_to_move() {
        let game = TicTacToe::new();
        // x x x / o o . / . . .
        let state = game.play(&[0, 3, 1, 4, 2]).unwrap();
        let outcome = game.terminal_outcome(&state).unwrap();
        assert_eq!(game.current_player(&state), Player::White);
        assert_eq!(outcome.value, -1.0);
        assert_eq!(outcome.score, Score::new(1.0, 0.0));
        assert!(game.legal_moves(&state).iter().all(|&v| v == 0.0));
        assert!(game.apply(&state, 8).is_err());
    }

    #[test]
    fn test_draw() {
        let game = TicTacToe::new();
        // x o x / x o o / o x x
        let state = game.play(&[0, 1, 2, 4, 3, 5, 7, 6, 8]).unwrap();
        let outcome = game.terminal_outcome(&state).unwrap();
        assert_eq!(outcome.value, 0.0);
        assert_eq!(outcome.score, Score::new(0.5, 0.5));
    }

    #[test]
    fn test_canonical_form_puts_mover_on_black() {
        let game = TicTacToe::new();
        let state = game.play(&[4]).unwrap();
        let canonical = game.canonical_form(&state, game.current_player(&state));

        assert_eq!(game.current_player(&canonical), Player::Black);
        assert_eq!(canonical.cells()[4], -1);
        // idempotent once canonical
        assert_eq!(game.canonical_form(&canonical, Player::Black), canonical);
    }

    #[test]
    fn test_history_planes_relative_to_mover() {
        let game = TicTacToe::new();
        let state = game.play(&[0, 8]).unwrap();
        let planes = game.canonical_history(&state);
        // Black to move: own stone at 0, opponent stone at 8
        assert_eq!(planes.get(0, 0, 0), 1.0);
        assert_eq!(planes.get(1, 2, 2), 1.0);
        assert_relative_eq!(planes.as_slice().iter().sum::<f32>(), 2.0);
    }

    #[test]
    fn test_canonical_and_plain_keys_differ() {
        let game = TicTacToe::new();
        let state = game.play(&[0]).unwrap();
        assert_eq!(game.state_key(&state, true).to_string(), "x........");
        assert_eq!(game.state_key(&state, false).to_string(), "x........W");
    }

    #[test]
    fn test_symmetries_cover_dihedral_group() {
        let game = TicTacToe::new();
        let state = game.play(&[0]).unwrap();
        let history = game.canonical_history(&state);
        let mut policy = vec![0.0; 9];
        policy[1] = 1.0;

        let augmented = game.symmetries(&history, &policy);
        assert_eq!(augmented.len(), 8);
        for (planes, pi) in &augmented {
            assert_relative_eq!(planes.as_slice().iter().sum::<f32>(), 1.0);
            assert_relative_eq!(pi.iter().sum::<f32>(), 1.0);
        }
    }
}
