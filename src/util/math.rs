//! Numeric helpers shared by the decoder and suppressor.

/// Returns true when `value` lies in `[0, 1]` (NaN is rejected).
pub(crate) fn in_unit_interval(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Returns the index and value of the largest element.
///
/// Ties keep the first occurrence. NaN never wins over a finite value, so an
/// all-NaN input yields `(0, NaN)`. Returns `None` for an empty iterator.
pub(crate) fn argmax_first<I>(values: I) -> Option<(usize, f32)>
where
    I: IntoIterator<Item = f32>,
{
    let mut best: Option<(usize, f32)> = None;
    for (idx, value) in values.into_iter().enumerate() {
        match best {
            None => best = Some((idx, value)),
            Some((_, current)) if value > current || (current.is_nan() && !value.is_nan()) => {
                best = Some((idx, value));
            }
            _ => {}
        }
    }
    best
}
