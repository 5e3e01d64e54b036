pub trait Statistic<D, T> {
    fn compute(&self, data: &D) -> T;
}

mod mean;
mod variance;
mod design_effect;
mod se;
mod critical;
mod ci;

pub use mean::{Mean, TotalWeight, WeightedMean};
pub(crate) use mean::KahanSum;
pub use variance::{BinomialVariance, WeightedVariance};
pub use design_effect::KishDesignEffect;
pub use se::{MeanVariance, VarianceCenter, VarianceMethod};
pub use critical::{critical_value, half_alpha, CriticalValues, FALLBACK_CRITICAL_VALUE};
pub use ci::{FormattedInterval, Interval, IntervalStyle};

// ===== 2-tuple =====
impl<D, T1, T2, S1, S2> Statistic<D, (T1, T2)> for (S1, S2)
where
    S1: Statistic<D, T1>,
    S2: Statistic<D, T2>,
{
    #[inline]
    fn compute(&self, data: &D) -> (T1, T2) {
        (self.0.compute(data), self.1.compute(data))
    }
}

// ===== 3-tuple =====
impl<D, T1, T2, T3, S1, S2, S3> Statistic<D, (T1, T2, T3)> for (S1, S2, S3)
where
    S1: Statistic<D, T1>,
    S2: Statistic<D, T2>,
    S3: Statistic<D, T3>,
{
    #[inline]
    fn compute(&self, data: &D) -> (T1, T2, T3) {
        (
            self.0.compute(data),
            self.1.compute(data),
            self.2.compute(data),
        )
    }
}
