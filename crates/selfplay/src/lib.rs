//! Self-play system for AlphaZero-style reinforcement learning
//!
//! This crate provides functionality for:
//! - Playing self-play games with a persistent search tree per game
//! - Turning played games into symmetry-augmented training examples
//! - Pitting two engines against each other in an arena
//! - Saving training data to NPY files for Python/PyTorch
//!
//! # Example
//!
//! ```no_run
//! use zero_core::{Rules, TicTacToe};
//! use zero_mcts::{MctsConfig, UniformOracle};
//! use zero_selfplay::{game_to_training_examples, play_game, save_training_data, SelfPlayConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let game = TicTacToe::new();
//! let oracle = UniformOracle::new(game.action_space_size());
//!
//! let record = play_game(&game, &oracle, MctsConfig::default(), &SelfPlayConfig::default())?;
//! println!("Game finished with {} moves", record.len());
//!
//! let examples = game_to_training_examples(&game, &record);
//! save_training_data(&examples, "selfplay_data")?;
//! # Ok(())
//! # }
//! ```

mod arena;
mod config;
mod data;
mod game;
pub mod storage;

// Re-export public API
pub use arena::{play_arena, ArenaPlayer, ArenaResult};
pub use config::{ArenaConfig, SelfPlayConfig};
pub use data::{GameRecord, GameResult, RecordedPosition, TrainingExample};
pub use game::{game_to_training_examples, play_game};
pub use storage::save_training_data;
