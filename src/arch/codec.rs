//! The model text format.
//!
//! One layer per line, blank lines are ignored:
//!
//! ```text
//! D <input size> <output size> <w_0_0> <w_0_1> ... <w_{in-1}_{out-1}>
//! L <size>
//! J <size>
//! ```
//!
//! Dense weights are listed input-major, the same `i * output_size + j` layout the layers use
//! in memory.

use std::{
    fmt::{self, Display},
    fs,
    io::{BufWriter, Write},
    path::Path,
    str::{FromStr, SplitWhitespace},
};

use log::debug;

use super::{
    Model,
    layers::{Layer, LayerKind},
    model::check_chain,
};
use crate::{NetErr, Result};

impl Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            LayerKind::Dense => {
                write!(f, "D {} {}", self.input_size(), self.output_size())?;
                for w in self.weights() {
                    write!(f, " {w}")?;
                }
                Ok(())
            }
            kind => write!(f, "{} {}", kind.token(), self.input_size()),
        }
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for layer in self.layers() {
            writeln!(f, "{layer}")?;
        }

        Ok(())
    }
}

impl FromStr for Model {
    type Err = NetErr;

    fn from_str(s: &str) -> Result<Self> {
        let mut layers: Vec<Layer> = Vec::new();

        for (i, line) in s.lines().enumerate() {
            let mut tokens = line.split_whitespace();
            let Some(token) = tokens.next() else {
                continue;
            };

            let mut reader = LineReader {
                line: i + 1,
                tokens,
            };

            let kind = LayerKind::from_token(token)?;
            let input_size = reader.next_size("input size")?;

            let layer = match kind {
                LayerKind::Dense => {
                    let output_size = reader.next_size("output size")?;
                    let weights = reader.rest()?;
                    Layer::dense(input_size, output_size, weights)?
                }
                LayerKind::LeakyRelu => Layer::leaky_relu(input_size)?,
                LayerKind::Judge => Layer::judge(input_size)?,
            };

            if let Some(prev) = layers.last() {
                check_chain(layers.len(), prev, &layer)?;
            }

            layers.push(layer);
        }

        Model::new(layers)
    }
}

impl Model {
    /// Reads a model from a text file.
    ///
    /// # Arguments
    /// * `path` - The file to read.
    ///
    /// # Returns
    /// The parsed model or the first I/O, parsing or validation error found.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let model: Model = fs::read_to_string(path)?.parse()?;
        debug!("model loaded from {}", path.display());
        Ok(model)
    }

    /// Writes this model to a text file, replacing its previous content.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        write!(writer, "{self}")?;
        writer.flush()?;
        Ok(())
    }
}

struct LineReader<'a> {
    line: usize,
    tokens: SplitWhitespace<'a>,
}

impl LineReader<'_> {
    fn next_size(&mut self, what: &str) -> Result<usize> {
        let line = self.line;
        let token = self.tokens.next().ok_or_else(|| NetErr::Parse {
            line,
            msg: format!("missing {what}"),
        })?;

        token.parse().map_err(|e| NetErr::Parse {
            line,
            msg: format!("invalid {what} '{token}': {e}"),
        })
    }

    fn rest(&mut self) -> Result<Vec<f32>> {
        let line = self.line;

        self.tokens
            .by_ref()
            .map(|token| {
                token.parse().map_err(|e| NetErr::Parse {
                    line,
                    msg: format!("invalid weight '{token}': {e}"),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn random_model() -> Model {
        let mut rng = StdRng::seed_from_u64(3);
        Model::new([
            Layer::dense_random(6, 4, &mut rng).unwrap(),
            Layer::leaky_relu(4).unwrap(),
            Layer::dense_random(4, 3, &mut rng).unwrap(),
            Layer::judge(3).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn format_is_one_layer_per_line() {
        let model = Model::new([
            Layer::dense(2, 1, vec![0.5, -1.25]).unwrap(),
            Layer::leaky_relu(1).unwrap(),
            Layer::judge(1).unwrap(),
        ])
        .unwrap();

        assert_eq!(model.to_string(), "D 2 1 0.5 -1.25\nL 1\nJ 1\n");
    }

    #[test]
    fn round_trip_is_bit_exact() {
        let model = random_model();
        let parsed: Model = model.to_string().parse().unwrap();

        assert_eq!(parsed, model);
        for (a, b) in parsed.layers().iter().zip(model.layers()) {
            let a_bits: Vec<u32> = a.weights().iter().map(|w| w.to_bits()).collect();
            let b_bits: Vec<u32> = b.weights().iter().map(|w| w.to_bits()).collect();
            assert_eq!(a_bits, b_bits);
        }
    }

    #[test]
    fn file_round_trip() {
        let model = random_model();
        let file = tempfile::NamedTempFile::new().unwrap();

        model.write_to(file.path()).unwrap();
        let loaded = Model::read_from(file.path()).unwrap();

        assert_eq!(loaded, model);
    }

    #[test]
    fn blank_lines_are_separators() {
        let model: Model = "\n  \nD 1 2 1 2\n\nJ 2\n\n".parse().unwrap();

        assert_eq!(model.layers().len(), 2);
        assert_eq!(model.output_size(), 2);
    }

    #[test]
    fn chain_mismatch_names_the_layer() {
        let text = format!(
            "D 784 100 {}\nD 50 10 {}\n",
            vec!["0"; 78400].join(" "),
            vec!["0"; 500].join(" ")
        );

        let err = text.parse::<Model>().unwrap_err();
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
    fn unknown_layer_type_is_unsupported() {
        let err = "D 1 1 1\nX 1\n".parse::<Model>().unwrap_err();
        assert!(matches!(err, NetErr::UnsupportedLayerKind(t) if t == "X"));
    }

    #[test]
    fn malformed_lines_are_parse_errors() {
        assert!(matches!(
            "J\n".parse::<Model>(),
            Err(NetErr::Parse { line: 1, .. })
        ));
        assert!(matches!(
            "D 1 2 0.5 abc\n".parse::<Model>(),
            Err(NetErr::Parse { line: 1, .. })
        ));
        assert!(matches!(
            "D 2 2 1 2 3\n".parse::<Model>(),
            Err(NetErr::ShapeMismatch {
                what: "dense weights",
                got: 3,
                expected: 4
            })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Model::read_from(dir.path().join("missing.model")).unwrap_err();

        assert!(matches!(err, NetErr::Io(_)));
    }
}
