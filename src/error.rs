use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, NetErr>;

/// The crate's error type.
///
/// Every variant is unrecoverable for the call that produced it, callers decide whether to
/// reload a checkpoint, lower the learning rate or give up.
#[derive(Debug)]
pub enum NetErr {
    /// A buffer's length disagrees with the shape it is used for.
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// Two adjacent layers disagree on the size of the vector flowing between them.
    LayerChainMismatch {
        layer: usize,
        expected: usize,
        got: usize,
    },
    /// The model text contained a layer type token this crate doesn't know.
    UnsupportedLayerKind(String),
    /// A NaN reached the judge layer, training has diverged.
    NumericDivergence { index: usize },
    /// A sample's class label is outside of the model's output range.
    InvalidLabel { label: usize, classes: usize },
    /// Training requires the last layer of the chain to be a judge.
    MissingJudge,
    /// A line of text input could not be tokenized.
    Parse { line: usize, msg: String },
    /// A run configuration is invalid.
    Config(String),
    Io(io::Error),
}

impl Display for NetErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "shape mismatch for {what}: got {got}, expected {expected}"
            ),
            NetErr::LayerChainMismatch {
                layer,
                expected,
                got,
            } => write!(
                f,
                "wrong input size for layer {layer:02}: expected {expected} (previous layer's output), got {got}"
            ),
            NetErr::UnsupportedLayerKind(kind) => write!(f, "unsupported layer type '{kind}'"),
            NetErr::NumericDivergence { index } => write!(
                f,
                "judge input[{index}] is NaN, the training diverged (lower the learning rate)"
            ),
            NetErr::InvalidLabel { label, classes } => write!(
                f,
                "label {label} is out of range for a model with {classes} classes"
            ),
            NetErr::MissingJudge => f.write_str("the last layer of a trained model must be a judge"),
            NetErr::Parse { line, msg } => write!(f, "parse error at line {line}: {msg}"),
            NetErr::Config(msg) => write!(f, "invalid config: {msg}"),
            NetErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for NetErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NetErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for NetErr {
    fn from(e: io::Error) -> Self {
        NetErr::Io(e)
    }
}
