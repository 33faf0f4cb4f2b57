// Module declarations
mod backup;
mod config;
mod counters;
mod dirichlet;
mod distribution;
mod error;
mod evaluation;
mod expansion;
mod mcts;
#[cfg(feature = "torch")]
mod network;
mod selection;
mod tree;

// Public exports
pub use config::MctsConfig;
pub use counters::SearchCounters;
pub use distribution::Diagnostics;
pub use error::{MctsError, Result};
pub use evaluation::{Oracle, UniformOracle};
pub use mcts::Mcts;
#[cfg(feature = "torch")]
pub use network::{NetworkOracle, NnModel, PolicyValueModel};
pub use tree::{Edge, Node, SearchTree};
