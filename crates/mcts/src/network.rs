use std::path::Path;

use tch::{CModule, Device, IValue, Kind, Tensor};
use zero_core::HistoryPlanes;

use crate::error::{MctsError, Result};
use crate::evaluation::Oracle;

/// Minimal interface required from a policy-value network
pub trait PolicyValueModel {
    fn forward(&self, x: &Tensor) -> tch::Result<(Tensor, Tensor)>;
    fn device(&self) -> Device;
}

/// TorchScript policy/value network returning `(policy_logits, value)`
pub struct NnModel {
    module: CModule,
    device: Device,
}

impl NnModel {
    pub fn load<P: AsRef<Path>>(path: P, device: Device) -> tch::Result<Self> {
        let module = CModule::load_on_device(path, device)?;
        Ok(Self { module, device })
    }
}

impl PolicyValueModel for NnModel {
    fn forward(&self, x: &Tensor) -> tch::Result<(Tensor, Tensor)> {
        let input_ivalue = IValue::Tensor(x.shallow_clone());
        match self.module.forward_is(&[input_ivalue])? {
            IValue::Tuple(elems) if elems.len() == 2 => {
                let mut elems = elems.into_iter();
                match (elems.next(), elems.next()) {
                    (Some(IValue::Tensor(policy)), Some(IValue::Tensor(value))) => Ok((policy, value)),
                    other => Err(tch::TchError::Kind(format!(
                        "Expected (Tensor, Tensor), got {other:?}"
                    ))),
                }
            }
            _ => Err(tch::TchError::Kind(
                "Expected TorchScript output to be a tuple of length 2".into(),
            )),
        }
    }

    fn device(&self) -> Device {
        self.device
    }
}

/// Oracle backed by a policy/value network.
///
/// The planes go in as a `[1, planes, n, n]` tensor; the policy logits
/// come back as softmax probabilities over the whole action space.
pub struct NetworkOracle<M: PolicyValueModel> {
    model: M,
}

impl<M: PolicyValueModel> NetworkOracle<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: PolicyValueModel> Oracle for NetworkOracle<M> {
    fn evaluate(&self, history: &HistoryPlanes) -> Result<(Vec<f32>, f32)> {
        let n = history.size() as i64;
        let input = Tensor::from_slice(history.as_slice())
            .view([1, history.planes() as i64, n, n])
            .to_device(self.model.device());

        let (policy_tensor, value_tensor) = self.model.forward(&input)?;

        let policy = policy_tensor
            .squeeze()
            .softmax(-1, Kind::Float)
            .to_device(Device::Cpu);
        let value = value_tensor.squeeze().to_device(Device::Cpu);

        Ok((tensor_to_vec_f32(&policy)?, tensor_to_f32(&value)?))
    }
}

/// Helper: Convert tensor to Vec<f32>
fn tensor_to_vec_f32(tensor: &Tensor) -> Result<Vec<f32>> {
    let size = tensor.size();
    if size.len() != 1 {
        return Err(MctsError::EvaluationFailed(format!(
            "Expected 1D tensor, got shape {:?}",
            size
        )));
    }

    let len = size[0] as usize;
    let mut vec = vec![0.0f32; len];
    tensor.copy_data(&mut vec, len);

    Ok(vec)
}

/// Helper: Convert tensor to f32
fn tensor_to_f32(tensor: &Tensor) -> Result<f32> {
    let size = tensor.size();
    if !size.is_empty() && size.iter().product::<i64>() != 1 {
        return Err(MctsError::EvaluationFailed(format!(
            "Expected scalar tensor, got shape {:?}",
            size
        )));
    }

    let mut value = [0.0f32; 1];
    tensor.copy_data(&mut value, 1);

    Ok(value[0])
}
