use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Large-sample two-sided 95% critical value, used for any unmapped alpha.
pub const FALLBACK_CRITICAL_VALUE: f64 = 1.96;

/// Coarse Student-t table: `(half-alpha, [df > 30, df > 20, df > 10, otherwise])`.
///
/// Buckets hold the t-value at df = ∞, 20, 10 and 5. These literals are part
/// of the output format and must not be replaced by exact quantiles.
const T_TABLE: [(f64, [f64; 4]); 3] = [
    (0.05, [1.645, 1.725, 1.812, 2.015]),
    (0.025, [1.96, 2.086, 2.228, 2.571]),
    (0.01, [2.576, 2.845, 3.169, 4.032]),
];

const KEY_TOLERANCE: f64 = 1e-9;

/// Table lookup of the critical value for `half_alpha` at `df` degrees of freedom.
///
/// ```
/// assert_eq!(tally::critical_value(0.025, 40), 1.96);
/// assert_eq!(tally::critical_value(0.025, 5), 2.571);
/// ```
pub fn critical_value(half_alpha: f64, df: usize) -> f64 {
    let Some((_, row)) = T_TABLE
        .iter()
        .find(|(key, _)| (key - half_alpha).abs() < KEY_TOLERANCE)
    else {
        tracing::debug!(half_alpha, "alpha not in critical value table, using 1.96");
        return FALLBACK_CRITICAL_VALUE;
    };

    let bucket = match df {
        d if d > 30 => 0,
        d if d > 20 => 1,
        d if d > 10 => 2,
        _ => 3,
    };
    row[bucket]
}

/// Half-alpha row used for a confidence level.
///
/// The three supported levels map onto the table rows directly; anything else
/// becomes `(1 − level) / 2` and usually misses the table.
pub fn half_alpha(confidence_level: f64) -> f64 {
    const LEVELS: [(f64, f64); 3] = [(0.90, 0.05), (0.95, 0.025), (0.99, 0.01)];
    LEVELS
        .iter()
        .find(|(level, _)| (level - confidence_level).abs() < KEY_TOLERANCE)
        .map_or((1.0 - confidence_level) / 2.0, |&(_, key)| key)
}

/// Source of the critical value multiplying the standard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CriticalValues {
    /// The fixed four-bucket table.
    #[default]
    Table,
    /// Exact `t_{1−α/2, df}` quantile. Falls back to the table when `df = 0`
    /// or the level is outside `(0, 1)`.
    StudentT,
}

impl CriticalValues {
    /// Critical value for a two-sided interval at `confidence_level`.
    pub fn lookup(self, confidence_level: f64, df: usize) -> f64 {
        match self {
            CriticalValues::Table => critical_value(half_alpha(confidence_level), df),
            CriticalValues::StudentT => student_t(confidence_level, df)
                .unwrap_or_else(|| critical_value(half_alpha(confidence_level), df)),
        }
    }
}

fn student_t(confidence_level: f64, df: usize) -> Option<f64> {
    if df == 0 || !(confidence_level > 0.0 && confidence_level < 1.0) {
        return None;
    }
    let dist = StudentsT::new(0.0, 1.0, df as f64).ok()?;
    let q = dist.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0);
    q.is_finite().then_some(q)
}
