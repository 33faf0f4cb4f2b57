use zero_core::{HistoryPlanes, Player, Score};

/// Result of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    BlackWin,
    WhiteWin,
    Draw,
}

impl GameResult {
    /// Interpret a terminal value given from `player`'s perspective
    pub fn from_value(value: f32, player: Player) -> Self {
        let winner = if value > 0.0 {
            player
        } else if value < 0.0 {
            player.opponent()
        } else {
            return GameResult::Draw;
        };
        match winner {
            Player::Black => GameResult::BlackWin,
            Player::White => GameResult::WhiteWin,
        }
    }
}

/// A position searched with a full search during self-play
#[derive(Debug, Clone)]
pub struct RecordedPosition {
    /// Oracle input planes of the canonical position
    pub history: HistoryPlanes,
    /// Player to move in the position
    pub player: Player,
    /// Policy target over the action space
    pub policy: Vec<f32>,
}

/// Record of a single game
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Every action played, in order
    pub moves: Vec<usize>,
    /// Positions kept as training targets
    pub positions: Vec<RecordedPosition>,
    /// Terminal value from `final_player`'s perspective
    pub final_value: f32,
    /// Player to move in the terminal position
    pub final_player: Player,
    pub winner: GameResult,
    pub score: Option<Score>,
}

impl GameRecord {
    /// Create a new empty game record
    pub fn new() -> Self {
        Self {
            moves: Vec::new(),
            positions: Vec::new(),
            final_value: 0.0,
            final_player: Player::Black,
            winner: GameResult::Draw,
            score: None,
        }
    }

    /// Store the terminal value and derive the winner from it
    pub fn finish(&mut self, value: f32, player: Player, score: Option<Score>) {
        self.final_value = value;
        self.final_player = player;
        self.winner = GameResult::from_value(value, player);
        self.score = score;
    }

    /// Outcome target for a position where `player` was to move
    pub fn value_for(&self, player: Player) -> f32 {
        if player == self.final_player {
            self.final_value
        } else {
            -self.final_value
        }
    }

    /// Get the number of moves in this game
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl Default for GameRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Training example for the policy/value network
#[derive(Debug, Clone)]
pub struct TrainingExample {
    pub state: HistoryPlanes,
    /// Target policy distribution
    pub policy: Vec<f32>,
    /// Target value in [-1, 1]
    pub value: f32,
}

impl TrainingExample {
    pub fn new(state: HistoryPlanes, policy: Vec<f32>, value: f32) -> Self {
        Self {
            state,
            policy,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_result_from_value() {
        assert_eq!(GameResult::from_value(1.0, Player::Black), GameResult::BlackWin);
        assert_eq!(GameResult::from_value(-1.0, Player::Black), GameResult::WhiteWin);
        assert_eq!(GameResult::from_value(1.0, Player::White), GameResult::WhiteWin);
        assert_eq!(GameResult::from_value(0.0, Player::White), GameResult::Draw);
    }

    #[test]
    fn test_value_for_flips_for_the_other_player() {
        let mut record = GameRecord::new();
        // White to move at the end and lost
        record.finish(-1.0, Player::White, None);

        assert_eq!(record.winner, GameResult::BlackWin);
        assert_eq!(record.value_for(Player::White), -1.0);
        assert_eq!(record.value_for(Player::Black), 1.0);
    }

    #[test]
    fn test_draw_value_is_zero_for_both() {
        let mut record = GameRecord::new();
        record.finish(0.0, Player::Black, Some(Score::new(0.5, 0.5)));

        assert_eq!(record.value_for(Player::Black), 0.0);
        assert_eq!(record.value_for(Player::White), 0.0);
        assert_eq!(record.winner, GameResult::Draw);
    }
}
