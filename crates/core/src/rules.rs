use std::fmt;

use thiserror::Error;

use crate::planes::HistoryPlanes;
use crate::symmetry::Symmetry;

/// Side to move. Black always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// +1.0 for Black, -1.0 for White
    pub fn sign(self) -> f32 {
        match self {
            Player::Black => 1.0,
            Player::White => -1.0,
        }
    }
}

/// Opaque identifier of a game state produced by [`Rules::state_key`].
///
/// Canonical and non-canonical keys live in separate key spaces; the engine
/// never mixes them in the same map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(Vec<u8>);

impl StateKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for StateKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<String> for StateKey {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&str> for StateKey {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Final score of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Score {
    pub black: f32,
    pub white: f32,
}

impl Score {
    pub fn new(black: f32, white: f32) -> Self {
        Self { black, white }
    }
}

/// Result of a finished game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// Value in [-1, 1] from the perspective of the player to move
    pub value: f32,
    pub score: Score,
}

/// Returned by [`Rules::apply`] when the action is not playable in the state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("illegal action {action}")]
pub struct IllegalAction {
    pub action: usize,
}

/// Capability interface the search engine requires from a rules engine.
///
/// Actions are indices into a fixed-size action space. Legality is reported
/// as a 0/1 mask of length [`Rules::action_space_size`].
pub trait Rules {
    type State: Clone;

    fn initial_state(&self) -> Self::State;

    /// Size of the action space, fixed for the lifetime of the rules value
    fn action_space_size(&self) -> usize;

    /// 0/1 mask over the action space
    fn legal_moves(&self, state: &Self::State) -> Vec<f32>;

    /// Play `action`, failing with [`IllegalAction`] if it is not legal.
    fn apply(&self, state: &Self::State, action: usize) -> Result<Self::State, IllegalAction>;

    fn current_player(&self, state: &Self::State) -> Player;

    /// Rewrite `state` from `player`'s point of view so that the player to
    /// move always appears as the same fixed side. Must be idempotent on
    /// states that are already canonical, and an action index must name the
    /// same move in a state and in its canonical form.
    fn canonical_form(&self, state: &Self::State, player: Player) -> Self::State;

    /// Input planes for the policy/value oracle
    fn canonical_history(&self, state: &Self::State) -> HistoryPlanes;

    fn state_key(&self, state: &Self::State, canonical: bool) -> StateKey;

    /// `None` while the game is still running.
    fn terminal_outcome(&self, state: &Self::State) -> Option<Outcome>;

    /// Indices of the legal actions, in increasing order
    fn legal_action_indices(&self, mask: &[f32]) -> Vec<usize> {
        mask.iter()
            .enumerate()
            .filter(|(_, &v)| v != 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Augmented (history, policy) pairs, one per board symmetry.
    fn symmetries(&self, history: &HistoryPlanes, policy: &[f32]) -> Vec<(HistoryPlanes, Vec<f32>)> {
        Symmetry::ALL
            .iter()
            .map(|sym| {
                (
                    sym.transform_planes(history),
                    sym.transform_policy(policy, history.size()),
                )
            })
            .collect()
    }
}
