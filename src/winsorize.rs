//! Percentile clipping of extreme values.

use crate::sample::{Dataset, Value};

/// Clips a numeric variable to nearest-rank percentile bounds.
///
/// Bounds are order statistics at `floor(n · p)` of the sorted parseable
/// values (no interpolation). Applying the same winsorizer twice changes
/// nothing the second time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Winsorizer {
    lower: f64,
    upper: f64,
}

impl Default for Winsorizer {
    fn default() -> Self {
        Self { lower: 0.05, upper: 0.95 }
    }
}

impl Winsorizer {
    /// Winsorizer for percentiles `lower` and `upper`, each clamped into
    /// `[0, 1]`.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower: lower.clamp(0.0, 1.0),
            upper: upper.clamp(0.0, 1.0),
        }
    }

    /// `(lower_bound, upper_bound)` for `variable`, or `None` when no value
    /// parses as a number.
    pub fn bounds(&self, data: &Dataset, variable: &str) -> Option<(f64, f64)> {
        let mut sorted: Vec<f64> = data
            .iter()
            .filter_map(|row| row.get(variable).as_f64())
            .collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_unstable_by(f64::total_cmp);

        let n = sorted.len();
        let rank = |p: f64| ((n as f64 * p).floor() as usize).min(n - 1);
        Some((sorted[rank(self.lower)], sorted[rank(self.upper)]))
    }

    /// A copy of `data` with every parseable `variable` clamped to the
    /// bounds. Unparseable cells are left untouched.
    pub fn apply(&self, data: &Dataset, variable: &str) -> Dataset {
        let Some((lo, hi)) = self.bounds(data, variable) else {
            return data.clone();
        };

        let mut clipped = 0_usize;
        let out: Dataset = data
            .iter()
            .map(|row| {
                let Some(x) = row.get(variable).as_f64() else {
                    return row.clone();
                };
                let clamped = x.max(lo).min(hi);
                if clamped != x {
                    clipped += 1;
                }
                let mut row = row.clone();
                row.set(variable, Value::Number(clamped));
                row
            })
            .collect();

        tracing::debug!(variable, lower = lo, upper = hi, clipped, "winsorized");
        out
    }
}

/// Winsorizes `variable` at the given percentiles; see [`Winsorizer`].
pub fn winsorize(data: &Dataset, variable: &str, lower: f64, upper: f64) -> Dataset {
    Winsorizer::new(lower, upper).apply(data, variable)
}
