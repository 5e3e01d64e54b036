use serde::{Deserialize, Serialize};

use crate::statistics::{CriticalValues, VarianceCenter, VarianceMethod};

/// Default number of bootstrap resamples.
pub const DEFAULT_BOOTSTRAP_REPLICATES: usize = 1000;

/// Configuration for a single estimation call.
///
/// Every recognized option lives here with its default, so callers only set
/// what they care about:
///
/// ```
/// use tally::{EstimationOptions, VarianceMethod};
///
/// let options = EstimationOptions::default()
///     .with_variance_method(VarianceMethod::Jackknife)
///     .with_confidence_level(0.99);
/// assert!(options.weighted);
/// ```
///
/// Deserializes from camelCase keys; missing keys take their defaults and an
/// unknown `varianceMethod` falls back to Taylor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EstimationOptions {
    /// Inflate the standard error by the Kish design effect. When `false` the
    /// design effect is exactly 1 whatever the weights look like.
    pub weighted: bool,
    /// Two-sided confidence level; 0.90, 0.95 and 0.99 have table rows.
    pub confidence_level: f64,
    pub variance_method: VarianceMethod,
    /// Apply `sqrt((N − n)/(N − 1))`; needs `population_size > n`.
    pub finite_population_correction: bool,
    pub population_size: Option<f64>,
    pub bootstrap_replicates: usize,
    pub bootstrap_center: VarianceCenter,
    pub critical_values: CriticalValues,
    /// Seed for the bootstrap RNG. `None` draws a fresh seed per estimator.
    pub seed: Option<u64>,
}

impl Default for EstimationOptions {
    fn default() -> Self {
        Self {
            weighted: true,
            confidence_level: 0.95,
            variance_method: VarianceMethod::Taylor,
            finite_population_correction: false,
            population_size: None,
            bootstrap_replicates: DEFAULT_BOOTSTRAP_REPLICATES,
            bootstrap_center: VarianceCenter::FullSample,
            critical_values: CriticalValues::Table,
            seed: None,
        }
    }
}

impl EstimationOptions {
    #[must_use]
    pub fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    #[must_use]
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    #[must_use]
    pub fn with_variance_method(mut self, method: VarianceMethod) -> Self {
        self.variance_method = method;
        self
    }

    /// Enables the finite population correction for a population of `size`.
    #[must_use]
    pub fn with_population_size(mut self, size: f64) -> Self {
        self.finite_population_correction = true;
        self.population_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_bootstrap(mut self, replicates: usize, center: VarianceCenter) -> Self {
        self.variance_method = VarianceMethod::Bootstrap;
        self.bootstrap_replicates = replicates;
        self.bootstrap_center = center;
        self
    }

    #[must_use]
    pub fn with_critical_values(mut self, critical_values: CriticalValues) -> Self {
        self.critical_values = critical_values;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Finite population correction factor for a sample of `n`, or 1 when the
    /// correction is off, the population size is missing, or `N ≤ n`.
    pub fn fpc(&self, n: usize) -> f64 {
        match self.population_size {
            Some(size) if self.finite_population_correction && size > n as f64 => {
                ((size - n as f64) / (size - 1.0)).sqrt()
            }
            _ => 1.0,
        }
    }
}
