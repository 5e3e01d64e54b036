use std::fmt;

use serde::Serialize;

use crate::statistics::{Interval, IntervalStyle, VarianceMethod};

/// A design-consistent point estimate with its uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyEstimate {
    /// `"x"`, `"x (category)"` or `"Total x"`.
    pub variable: String,
    pub estimate: f64,
    pub standard_error: f64,
    pub margin_of_error: f64,
    pub confidence_interval: Interval<f64>,
    /// Observations actually used, after filtering.
    pub sample_size: usize,
    pub effective_sample_size: f64,
    pub design_effect: f64,
    pub confidence_level: f64,
    pub variance_method: VarianceMethod,
}

impl SurveyEstimate {
    /// Relative standard error, `SE / |estimate|`.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.estimate == 0.0 {
            f64::INFINITY
        } else {
            self.standard_error / self.estimate.abs()
        }
    }
}

impl fmt::Display for SurveyEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.4} (SE {:.4}), {:.0}% CI {}, n = {}, deff = {:.2}",
            self.variable,
            self.estimate,
            self.standard_error,
            self.confidence_level * 100.0,
            self.confidence_interval.format(IntervalStyle::Bounds),
            self.sample_size,
            self.design_effect,
        )
    }
}
