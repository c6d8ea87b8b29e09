use std::{fs, path::Path};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    NetErr, Result,
    arch::layers::Layer,
    training::{DEFAULT_LEARNING_RATE, LrSchedule, default_steps},
};

/// The description of a single layer in a `RunConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSpec {
    Dense { input: usize, output: usize },
    LeakyRelu { size: usize },
    Judge { size: usize },
}

impl LayerSpec {
    /// Builds the layer, dense weights are drawn from `rng`.
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Layer> {
        match self {
            LayerSpec::Dense { input, output } => Layer::dense_random(input, output, rng),
            LayerSpec::LeakyRelu { size } => Layer::leaky_relu(size),
            LayerSpec::Judge { size } => Layer::judge(size),
        }
    }
}

/// The settings of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Where the model is resumed from and checkpointed to.
    pub model_path: String,
    pub train_data_path: String,
    /// A held-out labeled CSV the model is scored on once training is over.
    pub test_data_path: Option<String>,
    /// Applies to both data files.
    pub skip_header: bool,
    pub learning_rate: f32,
    /// Training passes over `train_data_path`, `0` only evaluates.
    pub passes: usize,
    /// How many samples between progress lines, `0` disables them.
    pub progress_every: usize,
    pub seed: Option<u64>,
    /// Size of the thread pool dense layers are parallelized on, `None` uses every core.
    pub threads: Option<usize>,
    /// The layers of a fresh model, ignored when resuming.
    pub layers: Vec<LayerSpec>,
    /// `(accuracy threshold, learning rate factor)` pairs.
    pub schedule: Vec<(f32, f32)>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model_path: "model.txt".into(),
            train_data_path: "train.csv".into(),
            test_data_path: None,
            skip_header: true,
            learning_rate: DEFAULT_LEARNING_RATE,
            passes: 1,
            progress_every: 1000,
            seed: None,
            threads: None,
            layers: Vec::new(),
            schedule: default_steps(),
        }
    }
}

impl RunConfig {
    /// Loads and validates a configuration from a JSON file.
    ///
    /// # Errors
    /// `NetErr::Io` if the file can't be read, `NetErr::Config` if it's invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        content.parse()
    }

    /// Checks the settings that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.passes == 0 && self.test_data_path.is_none() {
            return Err(NetErr::Config(
                "nothing to do: passes is zero and there is no test_data_path".into(),
            ));
        }

        if self.threads == Some(0) {
            return Err(NetErr::Config("threads must be greater than zero".into()));
        }

        Ok(())
    }

    /// Builds the layers of a fresh model.
    ///
    /// # Errors
    /// `NetErr::Config` if no layers are configured, a resumed model doesn't need any.
    pub fn build_layers<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Layer>> {
        if self.layers.is_empty() {
            return Err(NetErr::Config("layers must not be empty".into()));
        }

        self.layers.iter().map(|spec| spec.build(&mut *rng)).collect()
    }

    pub fn lr_schedule(&self) -> LrSchedule {
        LrSchedule::new(self.learning_rate, self.schedule.clone())
    }
}

impl std::str::FromStr for RunConfig {
    type Err = NetErr;

    fn from_str(s: &str) -> Result<Self> {
        let config: RunConfig =
            serde_json::from_str(s).map_err(|e| NetErr::Config(format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::layers::LayerKind;
    use rand::{SeedableRng, rngs::StdRng};

    const MNIST: &str = r#"{
        "model_path": "mnist.model",
        "train_data_path": "mnist_train.csv",
        "learning_rate": 8e-5,
        "passes": 128,
        "seed": 42,
        "layers": [
            { "dense": { "input": 784, "output": 100 } },
            { "leaky_relu": { "size": 100 } },
            { "dense": { "input": 100, "output": 10 } },
            { "judge": { "size": 10 } }
        ]
    }"#;

    #[test]
    fn parses_with_defaults() {
        let config: RunConfig = MNIST.parse().unwrap();

        assert_eq!(config.model_path, "mnist.model");
        assert_eq!(config.passes, 128);
        assert_eq!(config.seed, Some(42));
        assert!(config.skip_header);
        assert_eq!(config.progress_every, 1000);
        assert_eq!(config.schedule, default_steps());
        assert_eq!(config.layers[1], LayerSpec::LeakyRelu { size: 100 });
        assert!((config.lr_schedule().rate_for(0.99) - 8e-7).abs() < 1e-12);
    }

    #[test]
    fn builds_the_configured_layers() {
        let config: RunConfig = MNIST.parse().unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let layers = config.build_layers(&mut rng).unwrap();

        let kinds: Vec<_> = layers.iter().map(Layer::kind).collect();
        assert_eq!(
            kinds,
            [
                LayerKind::Dense,
                LayerKind::LeakyRelu,
                LayerKind::Dense,
                LayerKind::Judge
            ]
        );
        assert_eq!(layers[0].weights().len(), 78400);
    }

    #[test]
    fn rejects_useless_runs() {
        assert!(matches!(
            r#"{ "passes": 0, "layers": [{ "judge": { "size": 2 } }] }"#.parse::<RunConfig>(),
            Err(NetErr::Config(_))
        ));
        assert!(matches!(
            r#"{ "threads": 0, "layers": [{ "judge": { "size": 2 } }] }"#.parse::<RunConfig>(),
            Err(NetErr::Config(_))
        ));
        assert!(matches!(
            r#"{ "layers": [{ "conv": { "size": 2 } }] }"#.parse::<RunConfig>(),
            Err(NetErr::Config(_))
        ));
    }

    #[test]
    fn resume_only_config_needs_no_layers() {
        let config: RunConfig = r#"{ "model_path": "trained.model", "passes": 3 }"#
            .parse()
            .unwrap();
        assert!(config.layers.is_empty());

        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            config.build_layers(&mut rng),
            Err(NetErr::Config(_))
        ));
    }

    #[test]
    fn evaluation_only_config() {
        let config: RunConfig =
            r#"{ "passes": 0, "test_data_path": "mnist_test.csv", "skip_header": false }"#
                .parse()
                .unwrap();

        assert_eq!(config.passes, 0);
        assert_eq!(config.test_data_path.as_deref(), Some("mnist_test.csv"));
        assert!(!config.skip_header);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunConfig::load(dir.path().join("run.json")).unwrap_err();
        assert!(matches!(err, NetErr::Io(_)));
    }
}
