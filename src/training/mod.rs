mod layer_adjust;
mod sample;
mod schedule;
mod trainer;

pub use layer_adjust::LayerAdjust;
pub use sample::{Label, Sample};
pub use schedule::{LrSchedule, default_steps};
pub use trainer::{DEFAULT_LEARNING_RATE, Trainer};
