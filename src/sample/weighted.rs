use super::{Dataset, Row, Sample, Value};

/// An observation paired with its sampling weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedValue {
    pub value: f64,
    pub weight: f64,
}

impl WeightedValue {
    pub fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }

    /// Unit-weight observation.
    pub fn unweighted(value: f64) -> Self {
        Self { value, weight: 1.0 }
    }
}

impl From<(f64, f64)> for WeightedValue {
    fn from((value, weight): (f64, f64)) -> Self {
        Self { value, weight }
    }
}

/// Outcome of the row filter that precedes every estimate.
///
/// Dirty rows are dropped rather than rejected; `dropped` keeps the exclusion
/// visible so `kept.len()` is always the sample size actually used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filtered<T> {
    pub kept: Sample<T>,
    pub dropped: usize,
}

impl<T> Filtered<T> {
    fn collect(rows: usize, kept: Vec<T>) -> Self {
        let dropped = rows - kept.len();
        Self {
            kept: Sample::new(kept),
            dropped,
        }
    }
}

/// Weight of a row: the parsed weight cell, or 1 when there is no weight
/// column or the cell does not parse.
pub fn row_weight(row: &Row, weight_column: Option<&str>) -> f64 {
    weight_column
        .and_then(|column| row.get(column).as_f64())
        .unwrap_or(1.0)
}

/// Rows whose `variable` parses as a number and whose weight is positive.
pub fn numeric_values(
    data: &Dataset,
    variable: &str,
    weight_column: Option<&str>,
) -> Filtered<WeightedValue> {
    let kept = data
        .iter()
        .filter_map(|row| {
            let value = row.get(variable).as_f64()?;
            let weight = row_weight(row, weight_column);
            (weight > 0.0).then_some(WeightedValue { value, weight })
        })
        .collect();

    let filtered = Filtered::collect(data.len(), kept);
    log_dropped(variable, &filtered);
    filtered
}

/// 0/1 indicators of `row[variable] == category` for every row with positive
/// weight. Equality is strict: `Number(1)` never matches `Text("1")`, and a
/// row without the field never matches, not even a `Null` category.
pub fn indicator_values(
    data: &Dataset,
    variable: &str,
    category: &Value,
    weight_column: Option<&str>,
) -> Filtered<WeightedValue> {
    let kept = data
        .iter()
        .filter_map(|row| {
            let weight = row_weight(row, weight_column);
            let matches = row.contains(variable) && row.get(variable) == category;
            let value = if matches { 1.0 } else { 0.0 };
            (weight > 0.0).then_some(WeightedValue { value, weight })
        })
        .collect();

    let filtered = Filtered::collect(data.len(), kept);
    log_dropped(variable, &filtered);
    filtered
}

fn log_dropped<T>(variable: &str, filtered: &Filtered<T>) {
    if filtered.dropped > 0 {
        tracing::debug!(
            variable,
            kept = filtered.kept.len(),
            dropped = filtered.dropped,
            "excluded rows with unparseable values or non-positive weights"
        );
    }
}
