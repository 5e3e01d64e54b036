use crate::WeightedValue;
use super::mean::{KahanSum, WeightedMean};
use super::Statistic;

/// Weighted dispersion around the weighted mean:
/// ```text
/// s²_w = Σ wᵢ (xᵢ − x̄_w)² / Σ wᵢ
/// ```
/// This is the per-observation variance used by the linearized estimator;
/// dividing by `n` gives the variance of the weighted mean.
///
/// Fewer than two observations carry no dispersion and yield `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedVariance;

impl<D> Statistic<D, f64> for WeightedVariance
where
    D: AsRef<[WeightedValue]>,
{
    fn compute(&self, data: &D) -> f64 {
        let slice = data.as_ref();
        if slice.len() < 2 {
            return 0.0;
        }

        let mean = WeightedMean.compute(data);
        let mut sq_sum = KahanSum::zero();
        let mut total = KahanSum::zero();
        for wv in slice {
            let dev = wv.value - mean;
            sq_sum.add(wv.weight * dev * dev);
            total.add(wv.weight);
        }
        sq_sum.total() / total.total()
    }
}

/// Binomial variance `p (1 − p)` of a 0/1 indicator at the weighted
/// proportion `p`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinomialVariance;

impl<D> Statistic<D, f64> for BinomialVariance
where
    D: AsRef<[WeightedValue]>,
{
    fn compute(&self, data: &D) -> f64 {
        let p = WeightedMean.compute(data);
        p * (1.0 - p)
    }
}
