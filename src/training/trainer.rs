use std::path::Path;

use log::{debug, warn};

use super::{LayerAdjust, Sample};
use crate::{
    NetErr, Result,
    arch::{
        Model,
        layers::{Layer, LayerKind, argmax},
    },
};

/// The learning rate used whenever `adjust` is handed a non positive or non finite one.
pub const DEFAULT_LEARNING_RATE: f32 = 8e-7;

/// A model `Trainer`. Trains its model one sample at a time with plain gradient descent and
/// keeps count of how many samples it classified correctly along the way.
///
/// The per-layer scratch buffers are allocated once, in the constructor, and reused for every
/// sample.
#[derive(Debug)]
pub struct Trainer {
    model: Model,
    stages: Vec<LayerAdjust>,

    input: Vec<f32>,
    target: Vec<f32>,

    correct: usize,
    wrong: usize,
    warned_rate: bool,
}

impl Trainer {
    /// Creates a new `Trainer`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained, its last layer must be a judge.
    ///
    /// # Returns
    /// A new `Trainer` or `NetErr::MissingJudge`.
    pub fn new(model: Model) -> Result<Self> {
        let last = &model.layers()[model.layers().len() - 1];
        if last.kind() != LayerKind::Judge {
            return Err(NetErr::MissingJudge);
        }

        let stages = model.layers().iter().map(LayerAdjust::new).collect();
        debug!("trainer ready: {} stages", model.layers().len());

        Ok(Self {
            input: vec![0.; model.input_size()],
            target: vec![0.; model.output_size()],
            model,
            stages,
            correct: 0,
            wrong: 0,
            warned_rate: false,
        })
    }

    /// Creates a new `Trainer` for a model made of `layers`.
    pub fn create<I>(layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = Layer>,
    {
        Self::new(Model::new(layers)?)
    }

    /// Creates a new `Trainer` resuming from a model file.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(Model::read_from(path)?)
    }

    /// Runs a single training iteration: forward pass, evaluation, backward pass and weight
    /// update.
    ///
    /// # Arguments
    /// * `sample` - The sample to learn from.
    /// * `learning_rate` - The length of the gradient descent step, falls back to
    ///   `DEFAULT_LEARNING_RATE` if it isn't positive and finite.
    ///
    /// # Returns
    /// Whether the model classified the sample correctly before learning from it.
    ///
    /// # Errors
    /// * `NetErr::ShapeMismatch` if the sample doesn't fit the model.
    /// * `NetErr::InvalidLabel` if the label is out of the model's range.
    /// * `NetErr::NumericDivergence` if the training diverged, in which case neither the
    ///   counters nor the weights are touched.
    pub fn adjust(&mut self, sample: &Sample, learning_rate: f32) -> Result<bool> {
        let learning_rate = self.check_rate(learning_rate);
        let class = self.load(sample)?;

        self.forward()?;
        let correct = self.evaluate(class);
        self.backward(learning_rate)?;

        Ok(correct)
    }

    fn check_rate(&mut self, learning_rate: f32) -> f32 {
        if learning_rate.is_finite() && learning_rate > 0. {
            return learning_rate;
        }

        if !self.warned_rate {
            warn!("invalid learning rate {learning_rate}, using {DEFAULT_LEARNING_RATE}");
            self.warned_rate = true;
        }

        DEFAULT_LEARNING_RATE
    }

    /// Copies the sample into the input buffer and its one-hot label into the target buffer.
    fn load(&mut self, sample: &Sample) -> Result<usize> {
        if sample.values.len() != self.input.len() {
            return Err(NetErr::ShapeMismatch {
                what: "sample values",
                got: sample.values.len(),
                expected: self.input.len(),
            });
        }

        let class = sample.label.resolve(self.target.len())?;

        self.input.copy_from_slice(&sample.values);
        self.target.fill(0.);
        self.target[class] = 1.;

        Ok(class)
    }

    fn forward(&mut self) -> Result<()> {
        let layers = self.model.layers();

        for (k, layer) in layers.iter().enumerate() {
            let (below, rest) = self.stages.split_at_mut(k);
            let input = below.last().map_or(&self.input[..], |prev| prev.activation());
            rest[0].forward(layer, input)?;
        }

        Ok(())
    }

    fn evaluate(&mut self, class: usize) -> bool {
        let output = self.stages[self.stages.len() - 1].activation();
        let correct = argmax(output) == class;

        if correct {
            self.correct += 1;
        } else {
            self.wrong += 1;
        }

        correct
    }

    /// Walks the stages in reverse, the last one gets the target as its upstream error and
    /// every other one the error of the stage above it.
    fn backward(&mut self, learning_rate: f32) -> Result<()> {
        let layers = self.model.layers_mut();

        for (k, layer) in layers.iter_mut().enumerate().rev() {
            let (below, rest) = self.stages.split_at_mut(k);
            let (current, above) = rest.split_at_mut(1);

            let input = below.last().map_or(&self.input[..], |prev| prev.activation());
            let upstream = above.first().map_or(&self.target[..], |next| next.error());

            current[0].backward(layer, input, upstream, learning_rate)?;
        }

        Ok(())
    }

    pub fn correct_count(&self) -> usize {
        self.correct
    }

    pub fn wrong_count(&self) -> usize {
        self.wrong
    }

    pub fn iteration_count(&self) -> usize {
        self.correct + self.wrong
    }

    /// Returns the ratio of correctly classified samples since the last reset, `0` if there
    /// were none.
    pub fn accuracy(&self) -> f32 {
        match self.iteration_count() {
            0 => 0.,
            n => self.correct as f32 / n as f32,
        }
    }

    pub fn reset_counters(&mut self) {
        self.correct = 0;
        self.wrong = 0;
    }

    /// The training state of every layer, in order.
    pub fn stages(&self) -> &[LayerAdjust] {
        &self.stages
    }

    /// Returns a read-only view of the model being trained, it shares the trainer's weights.
    pub fn to_model(&self) -> &Model {
        &self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }

    /// Writes the current weights to a model file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.model.write_to(path)
    }
}
