use crate::WeightedValue;
use super::mean::KahanSum;
use super::Statistic;

/// Kish's design effect due to unequal weighting:
/// ```text
/// deff = n · Σwᵢ² / (Σwᵢ)²
/// ```
/// By Cauchy–Schwarz this is at least 1; the result is clamped so rounding
/// never reports a design *gain*. Empty input yields 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct KishDesignEffect;

impl<D> Statistic<D, f64> for KishDesignEffect
where
    D: AsRef<[WeightedValue]>,
{
    fn compute(&self, data: &D) -> f64 {
        let slice = data.as_ref();
        if slice.is_empty() {
            return 1.0;
        }

        let mut sum = KahanSum::zero();
        let mut sum_sq = KahanSum::zero();
        for wv in slice {
            sum.add(wv.weight);
            sum_sq.add(wv.weight * wv.weight);
        }

        let total = sum.total();
        let deff = slice.len() as f64 * sum_sq.total() / (total * total);
        if deff.is_finite() { deff.max(1.0) } else { 1.0 }
    }
}
