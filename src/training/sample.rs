use crate::{NetErr, Result, arch::layers::argmax};

/// What a sample is expected to be classified as.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    /// The index of the true class.
    Class(usize),
    /// A full target vector, its greatest value marks the true class.
    Target(Vec<f32>),
}

impl Label {
    /// Resolves this label into a single class index.
    ///
    /// # Arguments
    /// * `classes` - The amount of outputs of the model being trained.
    ///
    /// # Returns
    /// The true class, `NetErr::InvalidLabel` if it is out of range or
    /// `NetErr::ShapeMismatch` if a target vector doesn't have `classes` values.
    pub fn resolve(&self, classes: usize) -> Result<usize> {
        match self {
            Label::Class(label) if *label < classes => Ok(*label),
            Label::Class(label) => Err(NetErr::InvalidLabel {
                label: *label,
                classes,
            }),
            Label::Target(target) if target.len() == classes => Ok(argmax(target)),
            Label::Target(target) => Err(NetErr::ShapeMismatch {
                what: "label target",
                got: target.len(),
                expected: classes,
            }),
        }
    }
}

/// A labeled feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub values: Vec<f32>,
    pub label: Label,
}

impl Sample {
    pub fn new(values: Vec<f32>, label: Label) -> Self {
        Self { values, label }
    }

    /// Creates a sample labeled with a class index.
    pub fn with_class(values: Vec<f32>, class: usize) -> Self {
        Self::new(values, Label::Class(class))
    }
}
