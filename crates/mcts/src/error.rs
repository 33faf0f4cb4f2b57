use thiserror::Error;

use crate::distribution::Diagnostics;

#[derive(Error, Debug)]
pub enum MctsError {
    #[cfg(feature = "torch")]
    #[error("Torch error: {0}")]
    TorchError(#[from] tch::TchError),

    #[error("Oracle evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Oracle returned a policy of length {actual}, expected {expected}")]
    PolicyLength { expected: usize, actual: usize },

    #[error("Dirichlet sampling error: {0}")]
    DirichletError(String),

    #[error("No search has been run from a root yet")]
    RootNotInitialized,

    #[error("No legal moves available at the root")]
    NoLegalMoves,

    #[error("Search invariant violated: {0}")]
    InvariantViolation(Box<Diagnostics>),
}

pub type Result<T> = std::result::Result<T, MctsError>;
