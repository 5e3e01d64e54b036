use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Bootstrap, Jackknife, Re, Sample, WeightedValue};
use super::{Mean, Statistic, WeightedMean, WeightedVariance};

/// Variance estimator for the weighted mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum VarianceMethod {
    /// Closed-form linearized variance.
    #[default]
    Taylor,
    /// Resampling with replacement.
    Bootstrap,
    /// Delete-one jackknife.
    Jackknife,
}

impl VarianceMethod {
    /// Parses a method name; unknown names fall back to [`VarianceMethod::Taylor`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "taylor" | "linearization" => VarianceMethod::Taylor,
            "bootstrap" | "bs" => VarianceMethod::Bootstrap,
            "jackknife" | "jk" | "jk1" => VarianceMethod::Jackknife,
            other => {
                tracing::warn!(method = other, "unknown variance method, using taylor");
                VarianceMethod::Taylor
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VarianceMethod::Taylor => "taylor",
            VarianceMethod::Bootstrap => "bootstrap",
            VarianceMethod::Jackknife => "jackknife",
        }
    }
}

impl From<String> for VarianceMethod {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl fmt::Display for VarianceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point that bootstrap replicate deviations are measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VarianceCenter {
    /// The full-sample estimate: `Σ(θ*_b − θ̂)² / (B − 1)`.
    #[default]
    FullSample,
    /// The average replicate: `Σ(θ*_b − θ̄*)² / (B − 1)`.
    ReplicateMean,
}

/// Variance of the weighted mean under a chosen [`VarianceMethod`].
///
/// Every variant returns the variance of the *estimator*, so the standard
/// error is always its square root:
/// ```text
/// Taylor:    s²_w / n
/// Bootstrap: Σ(θ*_b − center)² / (B − 1)
/// Jackknife: (n − 1)/n · Σ(θ₍ᵢ₎ − θ̄₍.₎)²
/// ```
/// Samples with fewer than two observations have zero variance.
#[derive(Clone)]
pub enum MeanVariance<R: Rng> {
    Taylor,
    Bootstrap {
        resampler: Bootstrap<R>,
        replicates: usize,
        center: VarianceCenter,
    },
    Jackknife,
}

impl<R: Rng> MeanVariance<R> {
    /// Bootstrap with `replicates` resamples (at least 2).
    pub fn bootstrap(rng: R, replicates: usize, center: VarianceCenter) -> Self {
        MeanVariance::Bootstrap {
            resampler: Bootstrap::new(rng),
            replicates: replicates.max(2),
            center,
        }
    }

    pub fn method(&self) -> VarianceMethod {
        match self {
            MeanVariance::Taylor => VarianceMethod::Taylor,
            MeanVariance::Bootstrap { .. } => VarianceMethod::Bootstrap,
            MeanVariance::Jackknife => VarianceMethod::Jackknife,
        }
    }
}

impl<R: Rng + Clone> Statistic<Sample<WeightedValue>, f64> for MeanVariance<R> {
    fn compute(&self, data: &Sample<WeightedValue>) -> f64 {
        let n = data.len();
        if n < 2 {
            return 0.0;
        }

        match self {
            MeanVariance::Taylor => WeightedVariance.compute(data) / n as f64,
            MeanVariance::Bootstrap { resampler, replicates, center } => {
                let estimates: Vec<f64> = resampler
                    .re(data)
                    .take(*replicates)
                    .map(|resample| WeightedMean.compute(&resample))
                    .collect();
                let center = match center {
                    VarianceCenter::FullSample => WeightedMean.compute(data),
                    VarianceCenter::ReplicateMean => Mean.compute(&estimates),
                };
                squared_deviations(&estimates, center) / (estimates.len() - 1) as f64
            }
            MeanVariance::Jackknife => {
                let estimates: Vec<f64> = Jackknife.weighted_means(&data.data).collect();
                let center = Mean.compute(&estimates);
                let n = n as f64;
                (n - 1.0) / n * squared_deviations(&estimates, center)
            }
        }
    }
}

fn squared_deviations(estimates: &[f64], center: f64) -> f64 {
    estimates
        .iter()
        .map(|&theta| (theta - center) * (theta - center))
        .sum()
}
