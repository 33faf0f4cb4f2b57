use log::debug;
use rand::Rng;
use rand_distr::{Dirichlet, Distribution};

use crate::error::{MctsError, Result};

/// Dirichlet noise over the legal actions of a root node.
///
/// Weights are indexed by rank in the legal-action list (mask order), not by
/// action index. A fresh sample is drawn every time a node is treated as root.
#[derive(Debug, Clone)]
pub struct RootNoise {
    weights: Vec<f32>,
    epsilon: f32,
}

impl RootNoise {
    /// Sample noise for `legal_count` actions from a symmetric Dirichlet(alpha).
    pub fn sample<R: Rng + ?Sized>(
        rng: &mut R,
        legal_count: usize,
        alpha: f32,
        epsilon: f32,
    ) -> Result<Self> {
        let weights = match legal_count {
            0 => Vec::new(),
            // Dirichlet needs at least two categories
            1 => vec![1.0],
            n => {
                let alpha_vec = vec![alpha as f64; n];
                let dirichlet = Dirichlet::new(&alpha_vec)
                    .map_err(|e| MctsError::DirichletError(e.to_string()))?;
                let sample: Vec<f32> = dirichlet.sample(rng).iter().map(|&x| x as f32).collect();

                // Tiny alphas can underflow every gamma draw to zero
                if sample.iter().all(|x| x.is_finite()) {
                    sample
                } else {
                    debug!("Dirichlet sample underflowed, using uniform root noise");
                    vec![1.0 / n as f32; n]
                }
            }
        };

        Ok(Self { weights, epsilon })
    }

    /// Blend a prior with the noise of the `rank`-th legal action:
    /// P' = (1-ε)*P + ε*noise
    pub fn mix(&self, prior: f32, rank: usize) -> f32 {
        let noise = self.weights.get(rank).copied().unwrap_or(0.0);
        (1.0 - self.epsilon) * prior + self.epsilon * noise
    }

    #[cfg(test)]
    pub(crate) fn from_weights(weights: Vec<f32>, epsilon: f32) -> Self {
        Self { weights, epsilon }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[cfg(test)]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}
