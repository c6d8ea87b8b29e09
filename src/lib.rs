//! A minimal feed-forward neural network engine: dense layers, a leaky rectifier and a judge
//! layer that turns the network's output into a class, trained one sample at a time with plain
//! gradient descent and persisted in a small line-oriented text format.

pub mod arch;
pub mod background;
pub mod config;
pub mod dataset;
mod error;
pub mod training;

pub use arch::{Evaluation, Model};
pub use error::{NetErr, Result};
pub use training::{Label, Sample, Trainer};
