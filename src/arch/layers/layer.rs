use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::LayerOps;
use crate::{NetErr, Result};

/// The closed set of layer behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Dense,
    LeakyRelu,
    Judge,
}

impl LayerKind {
    /// Returns the token this kind is identified by in the model text format.
    pub fn token(self) -> &'static str {
        match self {
            LayerKind::Dense => "D",
            LayerKind::LeakyRelu => "L",
            LayerKind::Judge => "J",
        }
    }

    /// Resolves a model text token into a layer kind.
    ///
    /// # Arguments
    /// * `token` - The leading token of a model line.
    ///
    /// # Returns
    /// The kind, or `NetErr::UnsupportedLayerKind` if the token is unknown.
    pub fn from_token(token: &str) -> Result<Self> {
        match token {
            "D" => Ok(LayerKind::Dense),
            "L" => Ok(LayerKind::LeakyRelu),
            "J" => Ok(LayerKind::Judge),
            other => Err(NetErr::UnsupportedLayerKind(other.to_string())),
        }
    }
}

/// A unit of the network: its shape never changes after construction, only a dense layer's
/// weights get mutated (in place, by its updater).
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    kind: LayerKind,
    input_size: usize,
    output_size: usize,
    /// Row-major matrix with shape (input_size, output_size) for dense layers, empty otherwise.
    weights: Vec<f32>,
}

impl Layer {
    /// Creates a new dense layer from already existing weights.
    ///
    /// Element `(i, j)`, where `i` is an input index and `j` an output index, is read from
    /// `weights[i * output_size + j]`.
    ///
    /// # Arguments
    /// * `input_size` - The amount of inputs.
    /// * `output_size` - The amount of outputs.
    /// * `weights` - The flat weight matrix.
    ///
    /// # Returns
    /// A new dense `Layer` or `NetErr::ShapeMismatch` if the weights' length isn't
    /// `input_size * output_size`.
    pub fn dense(input_size: usize, output_size: usize, weights: Vec<f32>) -> Result<Self> {
        check_size("dense input size", input_size)?;
        check_size("dense output size", output_size)?;

        if weights.len() != input_size * output_size {
            return Err(NetErr::ShapeMismatch {
                what: "dense weights",
                got: weights.len(),
                expected: input_size * output_size,
            });
        }

        Ok(Self {
            kind: LayerKind::Dense,
            input_size,
            output_size,
            weights,
        })
    }

    /// Creates a new dense layer with every weight set to zero.
    pub fn dense_zeroed(input_size: usize, output_size: usize) -> Result<Self> {
        Self::dense(input_size, output_size, vec![0.; input_size * output_size])
    }

    /// Creates a new dense layer using LeCun normal initialization, that is, sampling every
    /// weight from a zero mean gaussian with a standard deviation of `1 / sqrt(input_size)`.
    ///
    /// # Arguments
    /// * `input_size` - The amount of inputs.
    /// * `output_size` - The amount of outputs.
    /// * `rng` - A random number generator.
    pub fn dense_random<R>(input_size: usize, output_size: usize, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        check_size("dense input size", input_size)?;

        let std_dev = (1. / input_size as f32).sqrt();
        let normal = Normal::new(0., std_dev).map_err(|e| NetErr::Config(e.to_string()))?;
        let weights = (0..input_size * output_size)
            .map(|_| normal.sample(&mut *rng))
            .collect();

        Self::dense(input_size, output_size, weights)
    }

    /// Creates a new leaky rectifier layer, its input and output sizes are both `size`.
    pub fn leaky_relu(size: usize) -> Result<Self> {
        Self::stateless(LayerKind::LeakyRelu, size)
    }

    /// Creates a new judge layer, its input and output sizes are both `size`.
    pub fn judge(size: usize) -> Result<Self> {
        Self::stateless(LayerKind::Judge, size)
    }

    fn stateless(kind: LayerKind, size: usize) -> Result<Self> {
        check_size("layer size", size)?;

        Ok(Self {
            kind,
            input_size: size,
            output_size: size,
            weights: Vec::new(),
        })
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub(crate) fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    /// Returns the forward, backward and update functions for this layer's kind.
    pub fn ops(&self) -> LayerOps {
        self.kind.ops()
    }

    /// Applies this layer's forward transform.
    ///
    /// # Arguments
    /// * `input` - A vector of `input_size` values.
    /// * `output` - The destination, `output_size` long.
    pub fn forward(&self, input: &[f32], output: &mut [f32]) -> Result<()> {
        (self.ops().forward)(self, input, output)
    }
}

fn check_size(what: &'static str, size: usize) -> Result<()> {
    if size == 0 {
        return Err(NetErr::ShapeMismatch {
            what,
            got: 0,
            expected: 1,
        });
    }

    Ok(())
}
