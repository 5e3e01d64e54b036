use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sample::{Dataset, Value};
use super::{EstimationError, SurveyEstimate, SurveyEstimator};

/// Which estimate a batch computes for each variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimationKind {
    Mean,
    /// One estimate per distinct category of the variable.
    Proportion,
    Total,
}

/// One line of a batch: a variable (and category, for proportions) with its
/// estimate or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub variable: String,
    pub category: Option<Value>,
    pub outcome: Result<SurveyEstimate, EstimationError>,
}

/// Distinct non-null values of `variable`, in first-seen order.
pub fn categories(data: &Dataset, variable: &str) -> Vec<Value> {
    let mut seen: Vec<Value> = Vec::new();
    for row in data {
        let value = row.get(variable);
        if value.is_null() || matches!(value, Value::Number(x) if x.is_nan()) {
            continue;
        }
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }
    seen
}

impl<R: Rng> SurveyEstimator<R> {
    /// Estimates every variable in `variables`.
    ///
    /// A variable that cannot be estimated yields an `Err` entry; the rest of
    /// the batch is unaffected.
    pub fn estimate_batch(
        &mut self,
        data: &Dataset,
        variables: &[&str],
        kind: EstimationKind,
        weight_column: Option<&str>,
    ) -> Vec<BatchEntry> {
        let mut entries = Vec::new();

        for &variable in variables {
            match kind {
                EstimationKind::Mean | EstimationKind::Total => {
                    let outcome = if kind == EstimationKind::Mean {
                        self.weighted_mean(data, variable, weight_column)
                    } else {
                        self.weighted_total(data, variable, weight_column)
                    };
                    entries.push(entry(variable, None, outcome));
                }
                EstimationKind::Proportion => {
                    let levels = categories(data, variable);
                    if levels.is_empty() {
                        entries.push(entry(variable, None, Err(EstimationError::empty(variable))));
                        continue;
                    }
                    for category in levels {
                        let outcome =
                            self.weighted_proportion(data, variable, &category, weight_column);
                        entries.push(entry(variable, Some(category), outcome));
                    }
                }
            }
        }

        entries
    }
}

fn entry(
    variable: &str,
    category: Option<Value>,
    outcome: Result<SurveyEstimate, EstimationError>,
) -> BatchEntry {
    if let Err(err) = &outcome {
        tracing::warn!(variable, error = %err, "skipping variable in batch");
    }
    BatchEntry {
        variable: variable.to_owned(),
        category,
        outcome,
    }
}
