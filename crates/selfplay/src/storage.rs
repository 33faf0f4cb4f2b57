use anyhow::{ensure, Result};
use ndarray::{Array, Array1, Array2, Array4};
use ndarray_npy::write_npy;

use crate::data::TrainingExample;

/// Save training data to NPY files
///
/// Creates three separate files:
/// - `{path}_states.npy`: (N, planes, n, n) oracle input planes
/// - `{path}_policies.npy`: (N, A) policy targets
/// - `{path}_values.npy`: (N,) value targets
///
/// All examples must share the shape of the first one.
///
/// # Example
/// ```no_run
/// use zero_core::HistoryPlanes;
/// use zero_selfplay::storage::save_training_data;
/// use zero_selfplay::TrainingExample;
///
/// let examples = vec![
///     TrainingExample::new(HistoryPlanes::zeros(2, 3), vec![0.0; 9], 1.0),
/// ];
/// save_training_data(&examples, "selfplay_data").unwrap();
/// // Creates: selfplay_data_states.npy, selfplay_data_policies.npy, selfplay_data_values.npy
/// ```
pub fn save_training_data(examples: &[TrainingExample], path: &str) -> Result<()> {
    let Some(first) = examples.first() else {
        anyhow::bail!("Cannot save empty training data");
    };
    let (planes, size) = (first.state.planes(), first.state.size());
    let actions = first.policy.len();

    for (i, example) in examples.iter().enumerate() {
        ensure!(
            example.state.planes() == planes && example.state.size() == size,
            "Example {i} has {}x{}x{} planes, expected {planes}x{size}x{size}",
            example.state.planes(),
            example.state.size(),
            example.state.size()
        );
        ensure!(
            example.policy.len() == actions,
            "Example {i} has a policy of length {}, expected {actions}",
            example.policy.len()
        );
    }

    let states: Vec<f32> = examples
        .iter()
        .flat_map(|e| e.state.as_slice().iter().copied())
        .collect();
    let states_array: Array4<f32> =
        Array::from_shape_vec((examples.len(), planes, size, size), states)?;

    let policies: Vec<f32> = examples
        .iter()
        .flat_map(|e| e.policy.iter().copied())
        .collect();
    let policies_array: Array2<f32> = Array::from_shape_vec((examples.len(), actions), policies)?;

    let values: Vec<f32> = examples.iter().map(|e| e.value).collect();
    let values_array: Array1<f32> = Array::from_vec(values);

    write_npy(format!("{}_states.npy", path), &states_array)?;
    write_npy(format!("{}_policies.npy", path), &policies_array)?;
    write_npy(format!("{}_values.npy", path), &values_array)?;

    log::info!("Saved {} training examples to {}_*.npy", examples.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray_npy::read_npy;
    use std::fs;
    use zero_core::HistoryPlanes;

    fn example(fill: f32, value: f32) -> TrainingExample {
        TrainingExample::new(HistoryPlanes::new(2, 3, vec![fill; 18]), vec![1.0 / 9.0; 9], value)
    }

    #[test]
    fn test_save_and_load_training_data() {
        let base_path = std::env::temp_dir().join(format!("zero_selfplay_{}", std::process::id()));
        let base_path_str = base_path.to_str().unwrap();

        let examples = vec![example(1.0, 1.0), example(0.0, -1.0)];
        save_training_data(&examples, base_path_str).unwrap();

        let states_path = format!("{}_states.npy", base_path_str);
        let policies_path = format!("{}_policies.npy", base_path_str);
        let values_path = format!("{}_values.npy", base_path_str);

        let states: Array4<f32> = read_npy(&states_path).unwrap();
        let policies: Array2<f32> = read_npy(&policies_path).unwrap();
        let values: Array1<f32> = read_npy(&values_path).unwrap();

        assert_eq!(states.shape(), &[2, 2, 3, 3]);
        assert_eq!(policies.shape(), &[2, 9]);
        assert_eq!(values.shape(), &[2]);

        assert_eq!(states[[0, 1, 2, 2]], 1.0);
        assert_eq!(states[[1, 0, 0, 0]], 0.0);
        assert_relative_eq!(values[0], 1.0);
        assert_relative_eq!(values[1], -1.0);
        assert_relative_eq!(policies[[1, 4]], 1.0 / 9.0);
        assert_relative_eq!(policies.row(0).sum(), 1.0, epsilon = 1e-6);

        fs::remove_file(states_path).ok();
        fs::remove_file(policies_path).ok();
        fs::remove_file(values_path).ok();
    }

    #[test]
    fn test_save_empty_data_fails() {
        let examples: Vec<TrainingExample> = vec![];
        assert!(save_training_data(&examples, "test").is_err());
    }

    #[test]
    fn test_mismatched_shapes_fail() {
        let mut odd = example(0.0, 0.0);
        odd.policy.push(0.0);
        let examples = vec![example(0.0, 0.0), odd];
        assert!(save_training_data(&examples, "unused").is_err());
    }
}
