use super::{Layer, ops::check_len};
use crate::{NetErr, Result};

/// Checks that no value diverged and passes `input` through.
pub(super) fn forward(layer: &Layer, input: &[f32], output: &mut [f32]) -> Result<()> {
    check_len("judge input", input.len(), layer.input_size())?;
    check_len("judge output", output.len(), layer.output_size())?;

    if let Some(index) = input.iter().position(|v| v.is_nan()) {
        return Err(NetErr::NumericDivergence { index });
    }

    output.copy_from_slice(input);
    Ok(())
}

/// The judge is the loss layer, its `upstream` is the one-hot encoding of the true class `t`:
/// `output[t] = input[t] - 1` and `output[i] = input[i]` everywhere else, the squared error
/// gradient against the one-hot target.
pub(super) fn backward(
    layer: &Layer,
    input: &[f32],
    upstream: &[f32],
    output: &mut [f32],
) -> Result<()> {
    check_len("judge input", input.len(), layer.input_size())?;
    check_len("judge target", upstream.len(), layer.output_size())?;
    check_len("judge error", output.len(), layer.input_size())?;

    for ((e, &x), &t) in output.iter_mut().zip(input).zip(upstream) {
        *e = x - t;
    }

    Ok(())
}

/// Returns the index of the greatest value, the first one wins on ties.
///
/// # Arguments
/// * `values` - The values to scan, an empty slice yields `0`.
pub fn argmax(values: &[f32]) -> usize {
    let mut max = 0;

    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[max] {
            max = i;
        }
    }

    max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_keeps_first_of_ties() {
        assert_eq!(argmax(&[0.5, 0.9, 0.9, 0.1]), 1);
    }

    #[test]
    fn argmax_tracks_the_running_max() {
        // An adjacent comparison would answer 3 here.
        assert_eq!(argmax(&[0.1, 5., 0.2, 0.3]), 1);
        assert_eq!(argmax(&[-3., -2., -1.]), 2);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn forward_rejects_nan() {
        let layer = Layer::judge(3).unwrap();
        let mut y = [0.; 3];

        let err = forward(&layer, &[0.1, f32::NAN, 0.2], &mut y).unwrap_err();
        assert!(matches!(err, NetErr::NumericDivergence { index: 1 }));
    }

    #[test]
    fn forward_passes_through() {
        let layer = Layer::judge(3).unwrap();
        let mut y = [0.; 3];

        forward(&layer, &[0.1, -2., f32::INFINITY], &mut y).unwrap();
        assert_eq!(y, [0.1, -2., f32::INFINITY]);
    }

    #[test]
    fn backward_subtracts_one_hot_target() {
        let layer = Layer::judge(3).unwrap();
        let mut e = [0.; 3];

        backward(&layer, &[0.2, 0.7, -0.4], &[0., 1., 0.], &mut e).unwrap();
        assert_eq!(e, [0.2, 0.7 - 1., -0.4]);
    }
}
