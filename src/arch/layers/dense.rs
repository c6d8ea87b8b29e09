use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Zip};

use super::{Layer, ops::check_len};
use crate::{NetErr, Result};

/// `output[j] = Σ_i input[i] * w[i][j]`, computed in parallel over `j`.
pub(super) fn forward(layer: &Layer, input: &[f32], output: &mut [f32]) -> Result<()> {
    check_len("dense input", input.len(), layer.input_size())?;
    check_len("dense output", output.len(), layer.output_size())?;

    let w = view_weights(layer)?;
    let x = ArrayView1::from(input);
    let mut y = ArrayViewMut1::from(output);

    Zip::from(&mut y)
        .and(w.columns())
        .par_for_each(|y, col| *y = col.dot(&x));

    Ok(())
}

/// `output[i] = Σ_j upstream[j] * w[i][j]`, that is, the transposed product.
pub(super) fn backward(
    layer: &Layer,
    _input: &[f32],
    upstream: &[f32],
    output: &mut [f32],
) -> Result<()> {
    check_len("dense upstream error", upstream.len(), layer.output_size())?;
    check_len("dense error", output.len(), layer.input_size())?;

    let w = view_weights(layer)?;
    let d = ArrayView1::from(upstream);
    let mut e = ArrayViewMut1::from(output);

    Zip::from(&mut e)
        .and(w.rows())
        .for_each(|e, row| *e = row.dot(&d));

    Ok(())
}

/// `w[i][j] -= learning_rate * upstream[j] * input[i]`, computed in parallel over `i`.
pub(super) fn update(
    layer: &mut Layer,
    input: &[f32],
    upstream: &[f32],
    learning_rate: f32,
) -> Result<()> {
    check_len("dense input", input.len(), layer.input_size())?;
    check_len("dense upstream error", upstream.len(), layer.output_size())?;

    let dim = (layer.input_size(), layer.output_size());
    let len = layer.weights().len();
    let mut w = ArrayViewMut2::from_shape(dim, layer.weights_mut()).map_err(|_| {
        NetErr::ShapeMismatch {
            what: "dense weights",
            got: len,
            expected: dim.0 * dim.1,
        }
    })?;
    let x = ArrayView1::from(input);
    let d = ArrayView1::from(upstream);

    Zip::from(w.rows_mut())
        .and(&x)
        .par_for_each(|mut row, &x| row.scaled_add(-learning_rate * x, &d));

    Ok(())
}

/// Gives a view of the flat weight buffer as an `(input_size, output_size)` matrix.
fn view_weights(layer: &Layer) -> Result<ArrayView2<'_, f32>> {
    let dim = (layer.input_size(), layer.output_size());

    ArrayView2::from_shape(dim, layer.weights()).map_err(|_| NetErr::ShapeMismatch {
        what: "dense weights",
        got: layer.weights().len(),
        expected: dim.0 * dim.1,
    })
}
