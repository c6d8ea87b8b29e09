use log::debug;

use super::layers::{Layer, argmax};
use crate::{NetErr, Result, training::Sample};

/// How a model did on a set of labeled samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: usize,
    pub wrong: usize,
}

impl Evaluation {
    pub fn count(&self) -> usize {
        self.correct + self.wrong
    }

    /// The ratio of correctly classified samples, `0` if there were none.
    pub fn accuracy(&self) -> f32 {
        match self.count() {
            0 => 0.,
            n => self.correct as f32 / n as f32,
        }
    }
}

/// A sequential model: information flows forward through its layers in order.
///
/// The layer chain is validated on construction, so the output size of every layer is the
/// input size of the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    layers: Vec<Layer>,
}

impl Model {
    /// Creates a new `Model`.
    ///
    /// # Arguments
    /// * `layers` - The layers the model is composed of.
    ///
    /// # Returns
    /// A new `Model` instance, `NetErr::ShapeMismatch` if there are no layers or
    /// `NetErr::LayerChainMismatch` naming the first layer whose input doesn't match.
    pub fn new<I>(layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = Layer>,
    {
        let layers: Vec<Layer> = layers.into_iter().collect();

        if layers.is_empty() {
            return Err(NetErr::ShapeMismatch {
                what: "layers",
                got: 0,
                expected: 1,
            });
        }

        for (k, pair) in layers.windows(2).enumerate() {
            check_chain(k + 1, &pair[0], &pair[1])?;
        }

        debug!(
            "model built: {} layers, {} -> {}",
            layers.len(),
            layers[0].input_size(),
            layers[layers.len() - 1].output_size()
        );

        Ok(Self { layers })
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn into_layers(self) -> Vec<Layer> {
        self.layers
    }

    /// Makes a forward pass through the model.
    ///
    /// # Arguments
    /// * `input` - The input vector, `input_size()` long.
    ///
    /// # Returns
    /// The output of the last layer, or an error if the input has the wrong length or the
    /// judge found a NaN.
    pub fn infer(&self, input: &[f32]) -> Result<Vec<f32>> {
        if input.len() != self.input_size() {
            return Err(NetErr::ShapeMismatch {
                what: "model input",
                got: input.len(),
                expected: self.input_size(),
            });
        }

        let mut x = input.to_vec();
        for layer in &self.layers {
            let mut y = vec![0.; layer.output_size()];
            layer.forward(&x, &mut y)?;
            x = y;
        }

        Ok(x)
    }

    /// Returns the predicted class for `input`, the index of the model's greatest output.
    pub fn classify(&self, input: &[f32]) -> Result<usize> {
        self.infer(input).map(|y| argmax(&y))
    }

    /// Classifies every sample and scores the predictions against their labels.
    ///
    /// # Arguments
    /// * `samples` - The labeled samples, as yielded by a dataset reader.
    ///
    /// # Returns
    /// The correct and wrong counts, or the first reading, shape or label error found.
    pub fn evaluate<I>(&self, samples: I) -> Result<Evaluation>
    where
        I: IntoIterator<Item = Result<Sample>>,
    {
        let mut evaluation = Evaluation::default();

        for sample in samples {
            let sample = sample?;
            let class = sample.label.resolve(self.output_size())?;

            if self.classify(&sample.values)? == class {
                evaluation.correct += 1;
            } else {
                evaluation.wrong += 1;
            }
        }

        debug!(
            "evaluated {} samples: {} correct",
            evaluation.count(),
            evaluation.correct
        );

        Ok(evaluation)
    }
}

/// Checks that `next`, the `k`-th layer, can consume what `prev` produces.
pub(crate) fn check_chain(k: usize, prev: &Layer, next: &Layer) -> Result<()> {
    if prev.output_size() != next.input_size() {
        return Err(NetErr::LayerChainMismatch {
            layer: k,
            expected: prev.output_size(),
            got: next.input_size(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::Label;

    #[test]
    fn chain_mismatch_is_rejected() {
        let err = Model::new([
            Layer::dense_zeroed(784, 100).unwrap(),
            Layer::dense_zeroed(50, 10).unwrap(),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            NetErr::LayerChainMismatch {
                layer: 1,
                expected: 100,
                got: 50
            }
        ));
    }

    #[test]
    fn empty_model_is_rejected() {
        assert!(Model::new(Vec::new()).is_err());
    }

    #[test]
    fn infer_chains_every_layer() {
        let model = Model::new([
            Layer::dense(2, 2, vec![1., -1., 1., 1.]).unwrap(),
            Layer::leaky_relu(2).unwrap(),
            Layer::dense(2, 1, vec![1., 2.]).unwrap(),
            Layer::judge(1).unwrap(),
        ])
        .unwrap();

        assert_eq!(model.input_size(), 2);
        assert_eq!(model.output_size(), 1);

        // dense: [3, 1] -> relu: [3, 1] -> dense: [5]
        assert_eq!(model.infer(&[1., 2.]).unwrap(), vec![5.]);
        // dense: [1, -3] -> relu: [1, -0.03] -> dense: [0.94]
        let y = model.infer(&[2., -1.]).unwrap();
        assert!((y[0] - 0.94).abs() < 1e-6, "{y:?}");
    }

    #[test]
    fn infer_checks_input_size() {
        let model = Model::new([Layer::judge(3).unwrap()]).unwrap();

        assert!(matches!(
            model.infer(&[1., 2.]),
            Err(NetErr::ShapeMismatch {
                what: "model input",
                got: 2,
                expected: 3
            })
        ));
    }

    #[test]
    fn classify_picks_greatest_output() {
        let model = Model::new([
            Layer::dense(2, 3, vec![1., 0., 0., 0., 1., 1.]).unwrap(),
            Layer::judge(3).unwrap(),
        ])
        .unwrap();

        assert_eq!(model.classify(&[1., 0.]).unwrap(), 0);
        // ties keep the first index
        assert_eq!(model.classify(&[0., 1.]).unwrap(), 1);
    }

    #[test]
    fn evaluate_counts_predictions() {
        let model = Model::new([
            Layer::dense(2, 2, vec![1., 0., 0., 1.]).unwrap(),
            Layer::judge(2).unwrap(),
        ])
        .unwrap();
        let samples = vec![
            Ok(Sample::with_class(vec![2., 1.], 0)),
            Ok(Sample::with_class(vec![0., 3.], 1)),
            Ok(Sample::with_class(vec![5., 1.], 1)),
            Ok(Sample::new(vec![-1., 4.], Label::Target(vec![0., 1.]))),
        ];

        let evaluation = model.evaluate(samples).unwrap();

        assert_eq!(
            evaluation,
            Evaluation {
                correct: 3,
                wrong: 1
            }
        );
        assert_eq!(evaluation.accuracy(), 0.75);
        assert_eq!(model.evaluate(Vec::<Result<Sample>>::new()).unwrap().accuracy(), 0.);
    }

    #[test]
    fn evaluate_stops_at_the_first_error() {
        let model = Model::new([Layer::judge(2).unwrap()]).unwrap();
        let samples = vec![
            Ok(Sample::with_class(vec![1., 0.], 0)),
            Ok(Sample::with_class(vec![1., 0.], 2)),
        ];

        assert!(matches!(
            model.evaluate(samples),
            Err(NetErr::InvalidLabel {
                label: 2,
                classes: 2
            })
        ));
        assert!(matches!(
            model.evaluate([Err::<Sample, _>(NetErr::Config("bad row".into()))]),
            Err(NetErr::Config(_))
        ));
    }

    #[test]
    fn nan_weights_diverge_at_the_judge() {
        let model = Model::new([
            Layer::dense(1, 2, vec![f32::NAN, 1.]).unwrap(),
            Layer::judge(2).unwrap(),
        ])
        .unwrap();

        assert!(matches!(
            model.infer(&[1.]),
            Err(NetErr::NumericDivergence { index: 0 })
        ));
    }
}
