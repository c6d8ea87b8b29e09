mod dense;
mod judge;
mod layer;
mod leaky_relu;
mod ops;

pub use judge::argmax;
pub use layer::{Layer, LayerKind};
pub use leaky_relu::{LEAK, ZERO_GRAD};
pub use ops::{BackwardFn, ForwardFn, LayerOps, UpdateFn};
