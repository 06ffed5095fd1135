use std::iter::repeat_n;

use itertools::Itertools;

use crate::quantity::{energy::WattHours, rate::KilowattHourRate};

/// Linear interpolation between two known samples.
pub trait Lerp: Copy {
    /// Value at `step` out of `n_steps` between `self` and `other`.
    #[must_use]
    fn lerp(self, other: Self, step: usize, n_steps: usize) -> Self;
}

impl Lerp for WattHours {
    /// Integer interpolation, truncated toward zero.
    #[expect(clippy::cast_possible_wrap)]
    fn lerp(self, other: Self, step: usize, n_steps: usize) -> Self {
        Self(self.0 + (other.0 - self.0) * step as i64 / n_steps as i64)
    }
}

impl Lerp for KilowattHourRate {
    #[expect(clippy::cast_precision_loss)]
    fn lerp(self, other: Self, step: usize, n_steps: usize) -> Self {
        Self(self.0 + (other.0 - self.0) * step as f64 / n_steps as f64)
    }
}

/// Fill the gaps in the samples.
///
/// Gaps between two known samples are linearly interpolated, leading and trailing gaps repeat
/// the nearest known sample.
///
/// # Returns
///
/// [`None`] when there is no known sample at all.
pub fn interpolate<T: Lerp>(samples: &[Option<T>]) -> Option<Vec<T>> {
    let known = samples
        .iter()
        .enumerate()
        .filter_map(|(index, sample)| sample.map(|sample| (index, sample)))
        .collect_vec();
    let (&(first_index, first), &(last_index, last)) = (known.first()?, known.last()?);

    let mut values = Vec::with_capacity(samples.len());
    values.extend(repeat_n(first, first_index));
    for ((left_index, left), (right_index, right)) in known.into_iter().tuple_windows() {
        let n_steps = right_index - left_index;
        values.extend((0..n_steps).map(|step| left.lerp(right, step, n_steps)));
    }
    values.push(last);
    values.extend(repeat_n(last, samples.len() - last_index - 1));
    Some(values)
}
