//! Game-side contract consumed by the search engine.
//!
//! The engine never looks inside a game state. Everything it needs (legal
//! moves, transitions, canonicalisation, keys, outcomes) comes through the
//! [`Rules`] trait. [`TicTacToe`] is a small reference implementation.

mod planes;
mod rules;
mod symmetry;
mod tictactoe;

pub use planes::HistoryPlanes;
pub use rules::{IllegalAction, Outcome, Player, Rules, Score, StateKey};
pub use symmetry::Symmetry;
pub use tictactoe::{TicTacToe, TicTacToeState};
