use super::{Layer, LayerKind, dense, judge, leaky_relu};
use crate::{NetErr, Result};

/// Applies a layer to `input`, writing `output`.
pub type ForwardFn = fn(layer: &Layer, input: &[f32], output: &mut [f32]) -> Result<()>;

/// Maps the error on a layer's output (`upstream`) into the error on its input (`output`).
/// `input` is whatever the layer was fed during the forward pass.
pub type BackwardFn =
    fn(layer: &Layer, input: &[f32], upstream: &[f32], output: &mut [f32]) -> Result<()>;

/// Takes a gradient descent step on a layer's weights.
pub type UpdateFn =
    fn(layer: &mut Layer, input: &[f32], upstream: &[f32], learning_rate: f32) -> Result<()>;

/// The behavior of a layer kind.
#[derive(Debug, Clone, Copy)]
pub struct LayerOps {
    pub forward: ForwardFn,
    pub backward: BackwardFn,
    pub update: UpdateFn,
}

const DENSE: LayerOps = LayerOps {
    forward: dense::forward,
    backward: dense::backward,
    update: dense::update,
};

const LEAKY_RELU: LayerOps = LayerOps {
    forward: leaky_relu::forward,
    backward: leaky_relu::backward,
    update: noop_update,
};

const JUDGE: LayerOps = LayerOps {
    forward: judge::forward,
    backward: judge::backward,
    update: noop_update,
};

impl LayerKind {
    /// Returns the function triple implementing this kind.
    pub fn ops(self) -> LayerOps {
        match self {
            LayerKind::Dense => DENSE,
            LayerKind::LeakyRelu => LEAKY_RELU,
            LayerKind::Judge => JUDGE,
        }
    }
}

/// Updater for stateless layers.
fn noop_update(_: &mut Layer, _: &[f32], _: &[f32], _: f32) -> Result<()> {
    Ok(())
}

pub(super) fn check_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(NetErr::ShapeMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}
