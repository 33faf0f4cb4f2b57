use zero_core::{HistoryPlanes, Symmetry};

use crate::error::{MctsError, Result};
use crate::evaluation::Oracle;

/// Query the oracle, optionally through a board symmetry.
///
/// With `symmetry` set, the planes are transformed before the query and the
/// returned prior is mapped back with the inverse transform, so the result
/// lines up with the untransformed board. The value is left as is.
pub fn evaluate_leaf<O: Oracle>(
    oracle: &O,
    history: &HistoryPlanes,
    action_space_size: usize,
    symmetry: Option<Symmetry>,
) -> Result<(Vec<f32>, f32)> {
    let (policy, value) = match symmetry {
        Some(sym) if !sym.is_identity() => {
            let (policy, value) = oracle.evaluate(&sym.transform_planes(history))?;
            check_policy_len(&policy, action_space_size)?;
            if policy.len() < history.cells() {
                return Err(MctsError::EvaluationFailed(format!(
                    "policy of length {} cannot cover a {}x{} board",
                    policy.len(),
                    history.size(),
                    history.size()
                )));
            }
            (sym.invert_policy(&policy, history.size()), value)
        }
        _ => oracle.evaluate(history)?,
    };

    check_policy_len(&policy, action_space_size)?;
    Ok((policy, value))
}

fn check_policy_len(policy: &[f32], expected: usize) -> Result<()> {
    if policy.len() != expected {
        return Err(MctsError::PolicyLength {
            expected,
            actual: policy.len(),
        });
    }
    Ok(())
}

/// Mask a raw prior by the legal moves and renormalise.
///
/// If the prior has no mass on any legal action the result is uniform over
/// the legal actions and the second element is `true`.
pub fn mask_prior(raw: &[f32], valid: &[f32]) -> (Vec<f32>, bool) {
    let masked: Vec<f32> = raw.iter().zip(valid).map(|(p, v)| p * v).collect();
    let sum: f32 = masked.iter().sum();

    if sum > 0.0 {
        return (masked.into_iter().map(|p| p / sum).collect(), false);
    }

    let legal: f32 = valid.iter().sum();
    let uniform = if legal > 0.0 {
        valid.iter().map(|v| v / legal).collect()
    } else {
        vec![0.0; valid.len()]
    };
    (uniform, true)
}
