use zero_core::HistoryPlanes;

use crate::error::Result;

/// Minimal interface required from a policy/value oracle
///
/// `evaluate` returns a prior over the full action space (not necessarily
/// masked or normalised) and a value in [-1, 1] for the player to move.
pub trait Oracle {
    fn evaluate(&self, history: &HistoryPlanes) -> Result<(Vec<f32>, f32)>;
}

impl<O: Oracle + ?Sized> Oracle for &O {
    fn evaluate(&self, history: &HistoryPlanes) -> Result<(Vec<f32>, f32)> {
        (**self).evaluate(history)
    }
}

/// Oracle with no knowledge: flat prior, neutral value.
#[derive(Debug, Clone, Copy)]
pub struct UniformOracle {
    action_space_size: usize,
}

impl UniformOracle {
    pub fn new(action_space_size: usize) -> Self {
        Self { action_space_size }
    }
}

impl Oracle for UniformOracle {
    fn evaluate(&self, _history: &HistoryPlanes) -> Result<(Vec<f32>, f32)> {
        let p = 1.0 / self.action_space_size.max(1) as f32;
        Ok((vec![p; self.action_space_size], 0.0))
    }
}
