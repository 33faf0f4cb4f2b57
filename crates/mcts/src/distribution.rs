use std::fmt;

use log::warn;

/// State dump attached to an invariant violation.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub reason: String,
    /// Canonical key of the root
    pub state: String,
    /// Legal-move mask at derivation time
    pub valid: Vec<f32>,
    /// Raw edge visit counts
    pub counts: Vec<f32>,
    /// Cached prior, if the root was ever expanded
    pub prior: Option<Vec<f32>>,
    /// (action, visits, q) for every edge taken
    pub edges: Vec<(usize, u32, f32)>,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at state {}", self.reason, self.state)
    }
}

/// Ways the counts-to-distribution step can break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Argmax at temperature 0 landed on an illegal action
    IllegalArgmax(usize),
    /// Nothing legal to put probability mass on
    NoLegalMass,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::IllegalArgmax(a) => write!(f, "argmax action {a} is illegal"),
            Violation::NoLegalMass => write!(f, "no legal action carries probability mass"),
        }
    }
}

/// Turn root edge visit counts into a move distribution.
///
/// - counts are masked by `valid`; if nothing legal was visited the mask
///   itself is used as counts
/// - `temp == 0`: one-hot on the first maximum
/// - otherwise counts^(1/temp), normalised, then masked again
pub fn visit_distribution(
    counts: &[f32],
    valid: &[f32],
    temp: f32,
) -> std::result::Result<Vec<f32>, Violation> {
    let raw_total: f32 = counts.iter().sum();
    let mut weights: Vec<f32> = counts.iter().zip(valid).map(|(c, v)| c * v).collect();

    if weights.iter().sum::<f32>() == 0.0 {
        if raw_total > 0.0 {
            warn!("All root visits fell on actions that are no longer legal, using the legal mask");
        }
        weights = valid.to_vec();
    }

    if temp == 0.0 {
        let best = argmax(&weights);
        if valid.get(best).copied().unwrap_or(0.0) == 0.0 {
            return Err(Violation::IllegalArgmax(best));
        }
        let mut probs = vec![0.0; weights.len()];
        probs[best] = 1.0;
        return Ok(probs);
    }

    // Scale by the max first so counts^(1/temp) cannot overflow
    let max = weights.iter().cloned().fold(0.0f32, f32::max) as f64;
    if max <= 0.0 {
        return Err(Violation::NoLegalMass);
    }
    let inv_temp = 1.0 / temp as f64;
    let powered: Vec<f64> = weights
        .iter()
        .map(|&w| {
            if w <= 0.0 {
                0.0
            } else {
                (w as f64 / max).powf(inv_temp)
            }
        })
        .collect();
    let total: f64 = powered.iter().sum();

    let probs: Vec<f32> = powered
        .iter()
        .zip(valid)
        .map(|(p, v)| (p / total) as f32 * v)
        .collect();

    Ok(probs)
}

/// Index of the first maximum
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
