use serde::{Deserialize, Serialize};

/// A learning rate decay keyed on accuracy: the better the model gets, the smaller its steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LrSchedule {
    pub initial: f32,
    /// `(threshold, factor)` pairs, the rate is scaled by the factor of the highest threshold
    /// the accuracy exceeds.
    pub steps: Vec<(f32, f32)>,
}

impl LrSchedule {
    pub fn new(initial: f32, steps: Vec<(f32, f32)>) -> Self {
        Self { initial, steps }
    }

    /// Creates a schedule with the default decay steps.
    pub fn with_default_steps(initial: f32) -> Self {
        Self::new(initial, default_steps())
    }

    /// Returns the initial rate scaled by the factor of the highest threshold strictly below
    /// `accuracy`, or the initial rate if there's none.
    pub fn rate_for(&self, accuracy: f32) -> f32 {
        self.factor_for(accuracy)
            .map_or(self.initial, |factor| self.initial * factor)
    }

    /// Picks the learning rate for the next pass.
    ///
    /// # Arguments
    /// * `current` - The rate the last pass ran with.
    /// * `accuracy` - The accuracy reached in the last pass, in `[0, 1]`.
    ///
    /// # Returns
    /// The scaled initial rate if `accuracy` exceeds a threshold, `current` otherwise, so a
    /// pass that falls below every threshold doesn't undo an earlier decay.
    pub fn next_rate(&self, current: f32, accuracy: f32) -> f32 {
        self.factor_for(accuracy)
            .map_or(current, |factor| self.initial * factor)
    }

    fn factor_for(&self, accuracy: f32) -> Option<f32> {
        self.steps
            .iter()
            .filter(|(threshold, _)| accuracy > *threshold)
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|&(_, factor)| factor)
    }
}

/// `x0.1` above 90% accuracy and `x0.01` above 95%.
pub fn default_steps() -> Vec<(f32, f32)> {
    vec![(0.9, 0.1), (0.95, 0.01)]
}
