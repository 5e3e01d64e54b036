//! Weighted means, proportions and totals with design-based uncertainty.
//!
//! Every estimate runs the same pipeline:
//! 1. filter rows to `(value, weight)` pairs, dropping unparseable values and
//!    non-positive weights;
//! 2. compute the point estimate and the variance of the estimator;
//! 3. inflate the standard error by `sqrt(deff)` (Kish) and the finite
//!    population correction;
//! 4. multiply by the critical value for the margin of error and interval.

mod batch;
mod error;
mod estimate;
mod options;

use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::sample::{indicator_values, numeric_values, row_weight, Dataset, Value, WeightedValue};
use crate::statistics::{
    BinomialVariance, Interval, KahanSum, KishDesignEffect, MeanVariance, Statistic, TotalWeight,
    VarianceMethod, WeightedMean,
};
use crate::Sample;

pub use batch::{categories, BatchEntry, EstimationKind};
pub use error::EstimationError;
pub use estimate::SurveyEstimate;
pub use options::{EstimationOptions, DEFAULT_BOOTSTRAP_REPLICATES};

/// Computes survey estimates under a fixed set of options.
///
/// The only state is the RNG feeding the bootstrap; each bootstrap estimate
/// draws a fresh child seed from it, so a seeded estimator reproduces the
/// same sequence of results.
#[derive(Debug, Clone)]
pub struct SurveyEstimator<R = Xoshiro256PlusPlus> {
    options: EstimationOptions,
    rng: R,
}

impl SurveyEstimator {
    /// Estimator seeded from `options.seed`, or from the thread RNG when unset.
    pub fn new(options: EstimationOptions) -> Self {
        let seed = options.seed.unwrap_or_else(|| rand::thread_rng().next_u64());
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            options,
        }
    }
}

impl Default for SurveyEstimator {
    fn default() -> Self {
        Self::new(EstimationOptions::default())
    }
}

impl<R: Rng> SurveyEstimator<R> {
    /// Estimator drawing bootstrap seeds from a caller-supplied RNG.
    /// `options.seed` is ignored.
    pub fn with_rng(options: EstimationOptions, rng: R) -> Self {
        Self { options, rng }
    }

    pub fn options(&self) -> &EstimationOptions {
        &self.options
    }

    /// Weighted mean of `variable`.
    pub fn weighted_mean(
        &mut self,
        data: &Dataset,
        variable: &str,
        weight_column: Option<&str>,
    ) -> Result<SurveyEstimate, EstimationError> {
        let sample = numeric_values(data, variable, weight_column).kept;
        let estimate = checked_mean(&sample, variable)?;
        let variance = self.mean_variance().compute(&sample);

        Ok(self.finish(variable.to_owned(), estimate, variance, &sample))
    }

    /// Weighted share of rows whose `variable` equals `category`.
    ///
    /// Uses the binomial variance `p(1 − p)/n` whatever the configured
    /// variance method; the interval is clipped to `[0, 1]`.
    pub fn weighted_proportion(
        &mut self,
        data: &Dataset,
        variable: &str,
        category: &Value,
        weight_column: Option<&str>,
    ) -> Result<SurveyEstimate, EstimationError> {
        let sample = indicator_values(data, variable, category, weight_column).kept;
        let estimate = checked_mean(&sample, variable)?.clamp(0.0, 1.0);
        let variance = BinomialVariance.compute(&sample) / sample.len() as f64;

        let mut result = self.finish(format!("{variable} ({category})"), estimate, variance, &sample);
        result.confidence_interval = result.confidence_interval.clamp(0.0, 1.0);
        Ok(result)
    }

    /// Weighted total: the weighted mean scaled by the sum of weights over
    /// *all* rows (unparseable weights count as 1).
    pub fn weighted_total(
        &mut self,
        data: &Dataset,
        variable: &str,
        weight_column: Option<&str>,
    ) -> Result<SurveyEstimate, EstimationError> {
        let mean = self.weighted_mean(data, variable, weight_column)?;
        let total_weight = data
            .iter()
            .map(|row| row_weight(row, weight_column))
            .collect::<KahanSum<f64>>()
            .total();
        let scale = total_weight.abs();

        let estimate = mean.estimate * total_weight;
        let margin_of_error = mean.margin_of_error * scale;

        Ok(SurveyEstimate {
            variable: format!("Total {variable}"),
            estimate,
            standard_error: mean.standard_error * scale,
            margin_of_error,
            confidence_interval: Interval::symmetric(estimate, margin_of_error),
            ..mean
        })
    }

    fn mean_variance(&mut self) -> MeanVariance<Xoshiro256PlusPlus> {
        match self.options.variance_method {
            VarianceMethod::Taylor => MeanVariance::Taylor,
            VarianceMethod::Jackknife => MeanVariance::Jackknife,
            VarianceMethod::Bootstrap => MeanVariance::bootstrap(
                Xoshiro256PlusPlus::seed_from_u64(self.rng.next_u64()),
                self.options.bootstrap_replicates,
                self.options.bootstrap_center,
            ),
        }
    }

    fn finish(
        &self,
        variable: String,
        estimate: f64,
        variance: f64,
        sample: &Sample<WeightedValue>,
    ) -> SurveyEstimate {
        let options = &self.options;
        let n = sample.len();

        let design_effect = if options.weighted {
            KishDesignEffect.compute(sample)
        } else {
            1.0
        };
        let standard_error =
            variance.max(0.0).sqrt() * design_effect.sqrt() * options.fpc(n);
        let critical = options
            .critical_values
            .lookup(options.confidence_level, n.saturating_sub(1));
        let margin_of_error = critical * standard_error;

        SurveyEstimate {
            variable,
            estimate,
            standard_error,
            margin_of_error,
            confidence_interval: Interval::symmetric(estimate, margin_of_error),
            sample_size: n,
            effective_sample_size: n as f64 / design_effect,
            design_effect,
            confidence_level: options.confidence_level,
            variance_method: options.variance_method,
        }
    }
}

/// Weighted mean of a filtered sample, or `EmptySample` when nothing (or
/// only zero weight) survived the filter.
fn checked_mean(sample: &Sample<WeightedValue>, variable: &str) -> Result<f64, EstimationError> {
    let (mean, total): (f64, f64) = sample.estimate(&(WeightedMean, TotalWeight));
    if sample.is_empty() || total <= 0.0 || !mean.is_finite() {
        return Err(EstimationError::empty(variable));
    }
    Ok(mean)
}

/// Weighted mean of `variable` with a default-seeded estimator.
pub fn weighted_mean(
    data: &Dataset,
    variable: &str,
    weight_column: Option<&str>,
    options: &EstimationOptions,
) -> Result<SurveyEstimate, EstimationError> {
    SurveyEstimator::new(options.clone()).weighted_mean(data, variable, weight_column)
}

/// Weighted proportion of `variable == category`.
pub fn weighted_proportion(
    data: &Dataset,
    variable: &str,
    category: &Value,
    weight_column: Option<&str>,
    options: &EstimationOptions,
) -> Result<SurveyEstimate, EstimationError> {
    SurveyEstimator::new(options.clone()).weighted_proportion(data, variable, category, weight_column)
}

/// Weighted total of `variable`.
pub fn weighted_total(
    data: &Dataset,
    variable: &str,
    weight_column: Option<&str>,
    options: &EstimationOptions,
) -> Result<SurveyEstimate, EstimationError> {
    SurveyEstimator::new(options.clone()).weighted_total(data, variable, weight_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::{CriticalValues, VarianceCenter};
    use crate::Row;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    fn xs(values: &[f64]) -> Dataset {
        values.iter().map(|&x| Row::new().with("x", x)).collect()
    }

    fn xw(pairs: &[(f64, f64)]) -> Dataset {
        pairs
            .iter()
            .map(|&(x, w)| Row::new().with("x", x).with("w", w))
            .collect()
    }

    fn survey() -> Dataset {
        (0..40)
            .map(|i| {
                let i = f64::from(i);
                Row::new()
                    .with("income", 20.0 + (i * 7.3) % 31.0)
                    .with("w", 1.0 + (i % 5.0))
                    .with("region", if i % 3.0 == 0.0 { "north" } else { "south" })
            })
            .collect()
    }

    #[test]
    fn unit_weight_mean_is_arithmetic_mean() {
        let data = xs(&[2.0, 4.0, 6.0]);
        let est = weighted_mean(&data, "x", None, &EstimationOptions::default()).unwrap();
        assert_abs_diff_eq!(est.estimate, 4.0, epsilon = 1e-12);
        assert_eq!(est.sample_size, 3);
        assert_eq!(est.design_effect, 1.0);
        assert_eq!(est.variable, "x");
    }

    #[test]
    fn weights_are_respected() {
        let data = xw(&[(10.0, 1.0), (20.0, 3.0)]);
        let est = weighted_mean(&data, "x", Some("w"), &EstimationOptions::default()).unwrap();
        assert_abs_diff_eq!(est.estimate, 17.5, epsilon = 1e-12);
        assert_abs_diff_eq!(est.design_effect, 1.25, epsilon = 1e-12);
        assert_abs_diff_eq!(est.effective_sample_size, 1.6, epsilon = 1e-12);
    }

    #[test]
    fn taylor_pipeline_matches_hand_computation() {
        let data = xs(&[2.0, 4.0, 6.0]);
        let est = weighted_mean(&data, "x", None, &EstimationOptions::default()).unwrap();
        // s²_w = 8/3, SE = sqrt(8/9), df = 2 → t = 2.571
        let se = (8.0_f64 / 9.0).sqrt();
        assert_abs_diff_eq!(est.standard_error, se, epsilon = 1e-12);
        assert_abs_diff_eq!(est.margin_of_error, 2.571 * se, epsilon = 1e-12);
        assert_abs_diff_eq!(est.confidence_interval.lower, 4.0 - 2.571 * se, epsilon = 1e-12);
        assert_abs_diff_eq!(est.confidence_interval.upper, 4.0 + 2.571 * se, epsilon = 1e-12);
    }

    #[test]
    fn unweighted_option_pins_design_effect_to_one() {
        let data = xw(&[(1.0, 0.1), (2.0, 50.0), (3.0, 7.0), (4.0, 1000.0)]);
        let weighted = weighted_mean(&data, "x", Some("w"), &EstimationOptions::default()).unwrap();
        let plain = weighted_mean(
            &data,
            "x",
            Some("w"),
            &EstimationOptions::default().with_weighted(false),
        )
        .unwrap();

        assert!(weighted.design_effect > 1.5);
        assert_eq!(plain.design_effect, 1.0);
        assert_eq!(plain.effective_sample_size, 4.0);
        assert_eq!(plain.estimate, weighted.estimate);
        assert!(plain.standard_error < weighted.standard_error);
    }

    #[test]
    fn empty_samples_fail_with_the_variable_name() {
        let options = EstimationOptions::default();
        let err = weighted_mean(&Dataset::default(), "x", None, &options).unwrap_err();
        assert_eq!(err, EstimationError::EmptySample { variable: "x".into() });

        let dirty: Dataset = Sample::new(vec![Row::new().with("x", "abc")]);
        let err = weighted_mean(&dirty, "x", None, &options).unwrap_err();
        assert_eq!(err.variable(), "x");
        assert_eq!(err.to_string(), "no valid values found for variable 'x'");
    }

    #[test]
    fn non_positive_weights_leave_nothing_to_estimate() {
        let data = xw(&[(1.0, 0.0), (2.0, -4.0)]);
        assert!(weighted_mean(&data, "x", Some("w"), &EstimationOptions::default()).is_err());
    }

    #[test]
    fn dirty_rows_only_shrink_the_sample() {
        let mut data = xs(&[1.0, 2.0, 3.0]);
        data.data.push(Row::new().with("x", "n/a"));
        data.data.push(Row::new());
        let est = weighted_mean(&data, "x", None, &EstimationOptions::default()).unwrap();
        assert_eq!(est.sample_size, 3);
        assert_abs_diff_eq!(est.estimate, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn total_scales_mean_by_weight_sum() {
        let data = survey();
        for method in [VarianceMethod::Taylor, VarianceMethod::Jackknife, VarianceMethod::Bootstrap] {
            let options = EstimationOptions::default().with_variance_method(method).with_seed(8);
            let mean = weighted_mean(&data, "income", Some("w"), &options).unwrap();
            let total = weighted_total(&data, "income", Some("w"), &options).unwrap();
            let weight_sum: f64 = data.iter().map(|row| row_weight(row, Some("w"))).sum();

            assert_eq!(total.estimate, mean.estimate * weight_sum);
            assert_relative_eq!(total.standard_error, mean.standard_error * weight_sum);
            assert_relative_eq!(total.margin_of_error, mean.margin_of_error * weight_sum);
            assert_eq!(total.sample_size, mean.sample_size);
            assert_eq!(total.design_effect, mean.design_effect);
            assert_eq!(total.variable, "Total income");
        }
    }

    #[test]
    fn total_weight_counts_rows_without_valid_values() {
        let mut data = xw(&[(10.0, 2.0), (20.0, 2.0)]);
        data.data.push(Row::new().with("x", "missing").with("w", 4.0));
        let options = EstimationOptions::default();
        let total = weighted_total(&data, "x", Some("w"), &options).unwrap();
        assert_abs_diff_eq!(total.estimate, 15.0 * 8.0, epsilon = 1e-9);
        assert_eq!(total.sample_size, 2);
    }

    #[test]
    fn total_weight_is_compensated_like_the_mean() {
        // a plain running sum rounds 1e16 + 4 down to 1e16 + 2
        let data = xw(&[(1.0, 1e16), (1.0, 1.0), (1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        let total = weighted_total(&data, "x", Some("w"), &EstimationOptions::default()).unwrap();
        assert_eq!(total.estimate, 1e16 + 4.0);
    }

    #[test]
    fn jackknife_keeps_spread_under_a_dominant_weight() {
        let data = xw(&[(1.0, 1e8), (2.0, 1e-8)]);
        let jackknife = EstimationOptions::default().with_variance_method(VarianceMethod::Jackknife);
        let est = weighted_mean(&data, "x", Some("w"), &jackknife).unwrap();

        // replicates 2 and 1: (1/2)·0.5 = 0.25, inflated by deff = 2
        assert_relative_eq!(est.standard_error, 0.5_f64.sqrt(), max_relative = 1e-9);
        assert!(est.confidence_interval.width() > 0.0);
    }

    #[test]
    fn absent_field_never_matches_a_null_category() {
        let data = Sample::new(vec![
            Row::new().with("answer", Value::Null),
            Row::new().with("answer", "yes"),
            Row::new(),
            Row::new(),
        ]);
        let est = weighted_proportion(&data, "answer", &Value::Null, None, &EstimationOptions::default())
            .unwrap();
        assert_eq!(est.estimate, 0.25);
        assert_eq!(est.sample_size, 4);
    }

    #[test]
    fn proportion_labels_category_and_uses_binomial_variance() {
        let data = survey();
        let options = EstimationOptions::default().with_weighted(false);
        let est =
            weighted_proportion(&data, "region", &Value::from("north"), None, &options).unwrap();

        // 14 of 40 rows have i % 3 == 0
        let p = 14.0 / 40.0;
        assert_eq!(est.variable, "region (north)");
        assert_abs_diff_eq!(est.estimate, p, epsilon = 1e-12);
        assert_abs_diff_eq!(est.standard_error, (p * (1.0 - p) / 40.0).sqrt(), epsilon = 1e-12);
        assert_eq!(est.sample_size, 40);
    }

    #[test]
    fn proportion_ignores_variance_method() {
        let data = survey();
        let north = Value::from("north");
        let taylor = EstimationOptions::default();
        let boot = EstimationOptions::default().with_bootstrap(50, VarianceCenter::FullSample);
        let a = weighted_proportion(&data, "region", &north, Some("w"), &taylor).unwrap();
        let b = weighted_proportion(&data, "region", &north, Some("w"), &boot).unwrap();
        assert_eq!(a.standard_error, b.standard_error);
    }

    #[test]
    fn proportion_interval_is_clipped() {
        let data: Dataset = (0..3).map(|_| Row::new().with("vote", "yes")).collect();
        let est =
            weighted_proportion(&data, "vote", &Value::from("yes"), None, &EstimationOptions::default())
                .unwrap();
        assert_eq!(est.estimate, 1.0);
        assert_eq!(est.confidence_interval.upper, 1.0);

        let mut data: Dataset = (0..9).map(|_| Row::new().with("vote", "no")).collect();
        data.data.push(Row::new().with("vote", "yes"));
        let est =
            weighted_proportion(&data, "vote", &Value::from("yes"), None, &EstimationOptions::default())
                .unwrap();
        assert_eq!(est.confidence_interval.lower, 0.0);
    }

    #[test]
    fn proportion_equality_is_strict() {
        let data: Dataset = Sample::new(vec![
            Row::new().with("code", 1),
            Row::new().with("code", "1"),
        ]);
        let options = EstimationOptions::default();
        let numeric = weighted_proportion(&data, "code", &Value::from(1), None, &options).unwrap();
        assert_eq!(numeric.estimate, 0.5);
        assert_eq!(numeric.variable, "code (1)");
    }

    #[test]
    fn finite_population_correction_shrinks_error() {
        let data = survey();
        let base = EstimationOptions::default();
        let open = weighted_mean(&data, "income", Some("w"), &base).unwrap();
        let closed =
            weighted_mean(&data, "income", Some("w"), &base.clone().with_population_size(80.0))
                .unwrap();
        let fpc = ((80.0_f64 - 40.0) / 79.0).sqrt();
        assert_relative_eq!(closed.standard_error, open.standard_error * fpc, max_relative = 1e-12);

        let too_small =
            weighted_mean(&data, "income", Some("w"), &base.with_population_size(40.0)).unwrap();
        assert_eq!(too_small.standard_error, open.standard_error);
    }

    #[test]
    fn confidence_level_selects_table_row() {
        let data = survey();
        let at = |level| {
            weighted_mean(
                &data,
                "income",
                None,
                &EstimationOptions::default().with_confidence_level(level),
            )
            .unwrap()
        };
        let (c90, c95, c99) = (at(0.90), at(0.95), at(0.99));
        // df = 39 → large-sample row
        assert_relative_eq!(c90.margin_of_error, 1.645 * c90.standard_error);
        assert_relative_eq!(c95.margin_of_error, 1.96 * c95.standard_error);
        assert_relative_eq!(c99.margin_of_error, 2.576 * c99.standard_error);
        assert!(c90.margin_of_error < c95.margin_of_error);
        assert!(c95.margin_of_error < c99.margin_of_error);
    }

    #[test]
    fn exact_student_t_is_opt_in() {
        let data = xs(&[3.0, 5.0, 9.0, 11.0]);
        let options = EstimationOptions::default().with_critical_values(CriticalValues::StudentT);
        let est = weighted_mean(&data, "x", None, &options).unwrap();
        // t(0.975, 3) = 3.182
        assert_relative_eq!(est.margin_of_error / est.standard_error, 3.182, max_relative = 1e-3);
    }

    #[test]
    fn seeded_bootstrap_is_reproducible() {
        let data = survey();
        let options = EstimationOptions::default()
            .with_bootstrap(300, VarianceCenter::FullSample)
            .with_seed(99);
        let a = weighted_mean(&data, "income", Some("w"), &options).unwrap();
        let b = weighted_mean(&data, "income", Some("w"), &options).unwrap();
        assert_eq!(a, b);

        let mut estimator = SurveyEstimator::new(options);
        let first = estimator.weighted_mean(&data, "income", Some("w")).unwrap();
        let second = estimator.weighted_mean(&data, "income", Some("w")).unwrap();
        assert_eq!(first, a);
        assert_ne!(first.standard_error, second.standard_error);
    }

    #[test]
    fn injected_rng_drives_bootstrap() {
        let data = survey();
        let options = EstimationOptions::default().with_bootstrap(200, VarianceCenter::ReplicateMean);
        let run = |seed| {
            SurveyEstimator::with_rng(options.clone(), Xoshiro256PlusPlus::seed_from_u64(seed))
                .weighted_mean(&data, "income", None)
                .unwrap()
        };
        assert_eq!(run(1), run(1));
        assert_eq!(run(1).variance_method, VarianceMethod::Bootstrap);
    }

    #[test]
    fn resampling_methods_agree_with_taylor() {
        let data = survey();
        let se = |method| {
            weighted_mean(
                &data,
                "income",
                None,
                &EstimationOptions::default().with_variance_method(method).with_seed(5),
            )
            .unwrap()
            .standard_error
        };
        let taylor = se(VarianceMethod::Taylor);
        assert_relative_eq!(se(VarianceMethod::Jackknife), taylor, max_relative = 0.15);
        assert_relative_eq!(se(VarianceMethod::Bootstrap), taylor, max_relative = 0.25);
    }

    #[test]
    fn single_observation_has_zero_width_interval() {
        let est = weighted_mean(&xs(&[7.0]), "x", None, &EstimationOptions::default()).unwrap();
        assert_eq!(est.standard_error, 0.0);
        assert_eq!(est.confidence_interval, Interval::new(7.0, 7.0));
    }

    #[test]
    fn estimate_serializes_camel_case() {
        let est = weighted_mean(&xs(&[1.0, 3.0]), "x", None, &EstimationOptions::default()).unwrap();
        let json = serde_json::to_value(&est).unwrap();
        assert_eq!(json["variable"], "x");
        assert_eq!(json["sampleSize"], 2);
        assert_eq!(json["varianceMethod"], "taylor");
        assert!(json["confidenceInterval"].is_array());
    }

    proptest! {
        #[test]
        fn proportion_interval_stays_in_unit_range(
            rows in prop::collection::vec((0u8..3, 0.1f64..10.0), 1..60),
            level in prop::sample::select(vec![0.90, 0.95, 0.99, 0.8]),
            weighted in any::<bool>(),
        ) {
            let data: Dataset = rows
                .iter()
                .map(|&(c, w)| Row::new().with("c", i32::from(c)).with("w", w))
                .collect();
            let options = EstimationOptions::default()
                .with_confidence_level(level)
                .with_weighted(weighted);
            let est = weighted_proportion(&data, "c", &Value::from(0), Some("w"), &options).unwrap();
            let ci = est.confidence_interval;

            prop_assert!(0.0 <= ci.lower);
            prop_assert!(ci.lower <= est.estimate);
            prop_assert!(est.estimate <= ci.upper);
            prop_assert!(ci.upper <= 1.0);
            prop_assert!(est.design_effect >= 1.0);
        }
    }
}
