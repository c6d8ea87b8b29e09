use super::{Layer, ops::check_len};
use crate::Result;

/// Slope applied to negative values. NaN takes this branch too, so it reaches the judge.
pub const LEAK: f32 = 0.01;

/// What an exact zero maps to, both forward and backward.
pub const ZERO_GRAD: f32 = f32::MIN_POSITIVE;

pub(super) fn forward(layer: &Layer, input: &[f32], output: &mut [f32]) -> Result<()> {
    check_len("leaky relu input", input.len(), layer.input_size())?;
    check_len("leaky relu output", output.len(), layer.output_size())?;

    for (y, &x) in output.iter_mut().zip(input) {
        *y = if x > 0. {
            x
        } else if x == 0. {
            ZERO_GRAD
        } else {
            x * LEAK
        };
    }

    Ok(())
}

/// Scales the upstream error by the slope taken at the forward *input*.
pub(super) fn backward(
    layer: &Layer,
    input: &[f32],
    upstream: &[f32],
    output: &mut [f32],
) -> Result<()> {
    check_len("leaky relu input", input.len(), layer.input_size())?;
    check_len("leaky relu upstream error", upstream.len(), layer.output_size())?;
    check_len("leaky relu error", output.len(), layer.input_size())?;

    for ((e, &x), &d) in output.iter_mut().zip(input).zip(upstream) {
        *e = if x > 0. {
            d
        } else if x == 0. {
            ZERO_GRAD
        } else {
            d * LEAK
        };
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_leaks_negatives() {
        let layer = Layer::leaky_relu(4).unwrap();
        let mut y = [0.; 4];

        forward(&layer, &[2., -3., 0., 0.5], &mut y).unwrap();

        assert_eq!(y, [2., -3. * LEAK, f32::MIN_POSITIVE, 0.5]);
        assert!(y[2] > 0.);
    }

    #[test]
    fn forward_is_idempotent_on_positive_vectors() {
        let layer = Layer::leaky_relu(5).unwrap();
        let x = [0.1, 4., 1e-3, 7.5, 1e6];
        let mut once = [0.; 5];
        let mut twice = [0.; 5];

        forward(&layer, &x, &mut once).unwrap();
        forward(&layer, &once, &mut twice).unwrap();

        assert_eq!(once, twice);
        assert_eq!(once, x);
    }

    #[test]
    fn backward_uses_the_input_sign() {
        let layer = Layer::leaky_relu(3).unwrap();
        let mut e = [0.; 3];

        // The upstream error's own sign must not matter.
        backward(&layer, &[1., -1., 0.], &[-2., 2., 5.], &mut e).unwrap();

        assert_eq!(e, [-2., 2. * LEAK, f32::MIN_POSITIVE]);
    }

    #[test]
    fn nan_is_carried_through() {
        let layer = Layer::leaky_relu(2).unwrap();
        let mut y = [0.; 2];
        let mut e = [0.; 2];

        forward(&layer, &[f32::NAN, -0.], &mut y).unwrap();
        assert!(y[0].is_nan());
        assert_eq!(y[1], ZERO_GRAD);

        backward(&layer, &[f32::NAN, 1.], &[f32::NAN, 3.], &mut e).unwrap();
        assert!(e[0].is_nan());
        assert_eq!(e[1], 3.);
    }
}
