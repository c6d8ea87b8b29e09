use crate::{
    Result,
    arch::layers::{Layer, LayerOps},
};

/// The training state of a single layer: its kind's behavior plus the buffers holding the
/// layer's latest forward output and backward error, reused on every sample.
#[derive(Debug)]
pub struct LayerAdjust {
    ops: LayerOps,
    activation: Vec<f32>,
    error: Vec<f32>,
}

impl LayerAdjust {
    /// Creates a new `LayerAdjust` sized for `layer`.
    pub fn new(layer: &Layer) -> Self {
        Self {
            ops: layer.ops(),
            activation: vec![0.; layer.output_size()],
            error: vec![0.; layer.input_size()],
        }
    }

    /// The output of the latest forward pass.
    pub fn activation(&self) -> &[f32] {
        &self.activation
    }

    /// The error on the layer's input computed by the latest backward pass.
    pub fn error(&self) -> &[f32] {
        &self.error
    }

    /// Runs the layer forward on `input` into this stage's activation.
    pub(super) fn forward(&mut self, layer: &Layer, input: &[f32]) -> Result<()> {
        (self.ops.forward)(layer, input, &mut self.activation)
    }

    /// Propagates `upstream` into this stage's error and then updates the layer's weights.
    ///
    /// # Arguments
    /// * `layer` - The layer this stage belongs to.
    /// * `input` - What the layer was fed in the forward pass.
    /// * `upstream` - The error on the layer's output.
    /// * `learning_rate` - The length of the gradient descent step.
    pub(super) fn backward(
        &mut self,
        layer: &mut Layer,
        input: &[f32],
        upstream: &[f32],
        learning_rate: f32,
    ) -> Result<()> {
        (self.ops.backward)(layer, input, upstream, &mut self.error)?;
        (self.ops.update)(layer, input, upstream, learning_rate)
    }
}
