use std::iter::FusedIterator;

use crate::statistics::KahanSum;
use crate::{Sample, WeightedValue};
use super::Re;

/// Delete-one jackknife.
///
/// [`Re::re`] materializes every leave-one-out sample (O(n²) copies), which
/// works for any statistic. For the weighted mean use
/// [`Jackknife::weighted_means`], which produces the same replicates in O(n).
#[derive(Clone, Copy, Default)]
pub struct Jackknife;

impl Jackknife {
    pub fn new() -> Self {
        Self
    }

    /// Leave-one-out weighted means from prefix and suffix sums.
    ///
    /// Replicate `i` joins the sums over `data[..i]` and `data[i + 1..]`; no
    /// observation is ever subtracted from a full-sample total.
    pub fn weighted_means(self, data: &[WeightedValue]) -> LeaveOneOutMeans<'_> {
        let mut suffix = vec![(0.0, 0.0); data.len() + 1];
        let mut weighted = KahanSum::zero();
        let mut total = KahanSum::zero();
        for (i, wv) in data.iter().enumerate().rev() {
            weighted.add(wv.value * wv.weight);
            total.add(wv.weight);
            suffix[i] = (weighted.total(), total.total());
        }

        LeaveOneOutMeans {
            data,
            suffix,
            weighted: KahanSum::zero(),
            total: KahanSum::zero(),
            idx: 0,
        }
    }
}

impl<T: Copy> Re<Sample<T>> for Jackknife {
    type Item = Sample<T>;
    fn re(&self, sample: &Sample<T>) -> impl Iterator<Item = Self::Item> {
        JackknifeIter::new(&sample.data)
    }
}

pub struct JackknifeIter<'a, T: Copy> {
    data: &'a [T],
    omit_idx: usize,
}

impl<'a, T: Copy> JackknifeIter<'a, T> {
    fn new(data: &'a [T]) -> Self {
        Self { data, omit_idx: 0 }
    }
}

impl<T: Copy> Iterator for JackknifeIter<'_, T> {
    type Item = Sample<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let omit = self.omit_idx;
        if omit >= self.data.len() {
            return None;
        }
        self.omit_idx += 1;

        let mut buffer = Vec::with_capacity(self.data.len() - 1);
        buffer.extend_from_slice(&self.data[..omit]);
        buffer.extend_from_slice(&self.data[omit + 1..]);
        Some(Sample::new(buffer))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len().saturating_sub(self.omit_idx);
        (remaining, Some(remaining))
    }
}

impl<T: Copy> ExactSizeIterator for JackknifeIter<'_, T> {}
impl<T: Copy> FusedIterator for JackknifeIter<'_, T> {}

/// Iterator returned by [`Jackknife::weighted_means`].
pub struct LeaveOneOutMeans<'a> {
    data: &'a [WeightedValue],
    /// `suffix[i]` holds `(Σ w·x, Σ w)` over `data[i..]`.
    suffix: Vec<(f64, f64)>,
    weighted: KahanSum<f64>,
    total: KahanSum<f64>,
    idx: usize,
}

impl Iterator for LeaveOneOutMeans<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let wv = self.data.get(self.idx)?;
        self.idx += 1;
        let (after_weighted, after_total) = self.suffix[self.idx];
        let mean = (self.weighted.total() + after_weighted) / (self.total.total() + after_total);

        self.weighted.add(wv.value * wv.weight);
        self.total.add(wv.weight);
        Some(mean)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len().saturating_sub(self.idx);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LeaveOneOutMeans<'_> {}
impl FusedIterator for LeaveOneOutMeans<'_> {}
