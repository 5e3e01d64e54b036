use num_traits::{Float, FromPrimitive};

use crate::WeightedValue;
use super::Statistic;

/// Arithmetic mean with **Kahan summation**.
#[derive(Clone, Copy, Default)]
pub struct Mean;

impl<D, F> Statistic<D, F> for Mean
where
    D: AsRef<[F]>,
    F: Float + FromPrimitive,
{
    fn compute(&self, data: &D) -> F {
        let slice = data.as_ref();
        let mut sum = KahanSum::zero();
        for &x in slice {
            sum.add(x);
        }
        // Empty input yields 0/0 = NaN
        sum.total() / F::from_usize(slice.len()).unwrap_or_else(F::nan)
    }
}

/// Weighted arithmetic mean `Σ(w·x) / Σw`.
///
/// Both sums are Kahan-compensated: survey weights routinely span several
/// orders of magnitude, which is exactly where naive summation drifts.
/// Returns `NaN` when the weights sum to zero.
#[derive(Clone, Copy, Default)]
pub struct WeightedMean;

impl<D> Statistic<D, f64> for WeightedMean
where
    D: AsRef<[WeightedValue]>,
{
    fn compute(&self, data: &D) -> f64 {
        let (weighted, total) = weighted_sums(data.as_ref());
        if total == 0.0 {
            return f64::NAN;
        }
        weighted / total
    }
}

/// Sum of weights, compensated.
#[derive(Clone, Copy, Default)]
pub struct TotalWeight;

impl<D> Statistic<D, f64> for TotalWeight
where
    D: AsRef<[WeightedValue]>,
{
    fn compute(&self, data: &D) -> f64 {
        weighted_sums(data.as_ref()).1
    }
}

/// `(Σ w·x, Σ w)`
fn weighted_sums(values: &[WeightedValue]) -> (f64, f64) {
    let mut weighted = KahanSum::zero();
    let mut total = KahanSum::zero();
    for wv in values {
        weighted.add(wv.value * wv.weight);
        total.add(wv.weight);
    }
    (weighted.total(), total.total())
}

/// Running compensated sum.
#[derive(Clone, Copy, Debug)]
pub(crate) struct KahanSum<F> {
    sum: F,
    c: F,
}

impl<F: Float> KahanSum<F> {
    pub(crate) fn zero() -> Self {
        Self { sum: F::zero(), c: F::zero() }
    }

    #[inline]
    pub(crate) fn add(&mut self, x: F) {
        let y = x - self.c;
        let t = self.sum + y;
        self.c = (t - self.sum) - y;
        self.sum = t;
    }

    pub(crate) fn total(&self) -> F {
        self.sum
    }
}

impl<F: Float> FromIterator<F> for KahanSum<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        let mut sum = Self::zero();
        for x in iter {
            sum.add(x);
        }
        sum
    }
}
