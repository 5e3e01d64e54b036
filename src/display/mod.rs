use std::fmt::{self, Display, Formatter};

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::estimator::{BatchEntry, SurveyEstimate};
use crate::statistics::IntervalStyle;

/// Terminal table of survey estimates.
///
/// Rows come either from estimates directly or from a batch; failed batch
/// entries are listed with their error instead of numbers.
pub struct EstimateTable {
    rows: Vec<Vec<Cell>>,
    confidence_level: Option<f64>,
}

impl EstimateTable {
    pub fn from_estimates<'a>(estimates: impl IntoIterator<Item = &'a SurveyEstimate>) -> Self {
        let mut table = Self { rows: Vec::new(), confidence_level: None };
        for est in estimates {
            table.push(est);
        }
        table
    }

    pub fn from_batch(entries: &[BatchEntry]) -> Self {
        let mut table = Self { rows: Vec::new(), confidence_level: None };
        for entry in entries {
            match &entry.outcome {
                Ok(est) => table.push(est),
                Err(err) => {
                    let mut row = vec![left(&entry.variable), left(err.to_string())];
                    row.extend((0..5).map(|_| right("–")));
                    table.rows.push(row);
                }
            }
        }
        table
    }

    fn push(&mut self, est: &SurveyEstimate) {
        self.confidence_level.get_or_insert(est.confidence_level);
        self.rows.push(vec![
            left(&est.variable),
            right(format!("{:.4}", est.estimate)),
            right(format!("{:.4}", est.standard_error)),
            right(est.confidence_interval.format(IntervalStyle::Bounds).to_string()),
            right(est.sample_size.to_string()),
            right(format!("{:.1}", est.effective_sample_size)),
            right(format!("{:.3}", est.design_effect)),
        ]);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let ci_header = match self.confidence_level {
            Some(level) => format!("{:.0}% CI", level * 100.0),
            None => "CI".to_owned(),
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(
                ["Variable", "Estimate", "SE", ci_header.as_str(), "n", "n eff", "Deff"]
                    .into_iter()
                    .map(|h| Cell::new(h).set_alignment(CellAlignment::Center)),
            );
        for row in &self.rows {
            table.add_row(row.clone());
        }
        table.to_string()
    }
}

impl Display for EstimateTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn left(text: impl ToString) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Left)
}

fn right(text: impl ToString) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}
