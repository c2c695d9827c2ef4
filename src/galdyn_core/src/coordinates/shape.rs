//! Batch shape bookkeeping for flat, row-major storage.
use std::ops::Range;

use crate::errors::{Error, GalResult};

/// Number of elements in a batch of the given shape, a 0-d batch holds one.
pub(crate) fn num_elements(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Check that storage of length `len` matches the batch shape.
pub(crate) fn check_len(shape: &[usize], len: usize) -> GalResult<()> {
    let expected = num_elements(shape);
    if expected != len {
        return Err(Error::ShapeMismatch(format!(
            "Batch shape {shape:?} requires {expected} elements, found {len}."
        )));
    }
    Ok(())
}

/// Flat storage range and resulting shape of the `idx`-th entry along the first axis.
pub(crate) fn index_first_axis(shape: &[usize], idx: usize) -> GalResult<(Range<usize>, Vec<usize>)> {
    let Some((&first, rest)) = shape.split_first() else {
        return Err(Error::IndexError(
            "Cannot index a scalar (0-d) phase-space position.".into(),
        ));
    };
    if idx >= first {
        return Err(Error::IndexError(format!(
            "Index {idx} is out of bounds for axis 0 with size {first}."
        )));
    }
    let stride = num_elements(rest);
    Ok((idx * stride..(idx + 1) * stride, rest.to_vec()))
}

/// Flat storage range and resulting shape of a range along the first axis.
pub(crate) fn slice_first_axis(
    shape: &[usize],
    range: Range<usize>,
) -> GalResult<(Range<usize>, Vec<usize>)> {
    let Some((&first, rest)) = shape.split_first() else {
        return Err(Error::IndexError(
            "Cannot slice a scalar (0-d) phase-space position.".into(),
        ));
    };
    if range.start > range.end || range.end > first {
        return Err(Error::IndexError(format!(
            "Slice {range:?} is out of bounds for axis 0 with size {first}."
        )));
    }
    let stride = num_elements(rest);
    let mut new_shape = Vec::with_capacity(shape.len());
    new_shape.push(range.end - range.start);
    new_shape.extend_from_slice(rest);
    Ok((range.start * stride..range.end * stride, new_shape))
}
