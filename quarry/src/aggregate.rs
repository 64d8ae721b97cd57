//! Derives a chart, summary insights and a display table from a result set.

use log::debug;
use serde::Serialize;

use crate::{AggregateError, Cell, ChartSpec, Number, Palette, Point, ResultSet};

/// Columns preferred as the grouping dimension, in priority order.
const DIMENSION_COLUMNS: [&str; 2] = ["classification", "vendor"];
/// The column preferred as the measure.
const MEASURE_COLUMN: &str = "count";
/// The dimension that is charted as proportions rather than comparisons.
const PROPORTION_DIMENSION: &str = "classification";

/// The dimension and measure columns chosen from a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    dimension: String,
    dimension_index: usize,
    measure: String,
    measure_index: usize,
}

impl Aggregation {
    /// Picks the dimension and measure columns by name.
    ///
    /// The dimension is the first of [`DIMENSION_COLUMNS`] present, or else
    /// the first column. The measure is the `count` column, or else the last
    /// column.
    pub fn select(result: &ResultSet) -> Result<Self, AggregateError> {
        let columns = result.columns();
        if columns.is_empty() {
            return Err(AggregateError::NoColumns);
        }
        let dimension_index = DIMENSION_COLUMNS
            .iter()
            .find_map(|name| result.column_index(name))
            .unwrap_or(0);
        let measure_index = result
            .column_index(MEASURE_COLUMN)
            .unwrap_or(columns.len() - 1);
        Ok(Self {
            dimension: columns[dimension_index].clone(),
            dimension_index,
            measure: columns[measure_index].clone(),
            measure_index,
        })
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn measure(&self) -> &str {
        &self.measure
    }
}

/// A category paired with its measure value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub label: String,
    pub value: Number,
}

/// Summary facts about one aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSet {
    total: Number,
    max: Entry,
    min: Entry,
}

impl InsightSet {
    pub fn total(&self) -> Number {
        self.total
    }

    /// The first entry holding the largest measure.
    pub fn max(&self) -> &Entry {
        &self.max
    }

    /// The first entry holding the smallest measure.
    pub fn min(&self) -> &Entry {
        &self.min
    }

    /// The insights phrased for display.
    pub fn sentences(&self) -> Vec<String> {
        vec![
            format!("Total number of cookies: {}", self.total),
            format!(
                "The category with the highest count is '{}' with {} cookies.",
                self.max.label, self.max.value
            ),
            format!(
                "The category with the lowest count is '{}' with {} cookies.",
                self.min.label, self.min.value
            ),
        ]
    }
}

/// The raw result set, stringified for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl From<&ResultSet> for Table {
    fn from(result: &ResultSet) -> Self {
        Self {
            columns: result.columns().to_vec(),
            rows: result
                .rows()
                .iter()
                .map(|row| row.iter().map(Cell::to_string).collect())
                .collect(),
        }
    }
}

/// The outputs of the aggregation stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub chart: ChartSpec,
    pub insights: InsightSet,
    pub table: Table,
}

/// Aggregates a result set into a chart, insights and a table.
///
/// Null measure values are skipped. Any other non-numeric measure value is an
/// error, as is a result set without rows.
pub fn aggregate(result: &ResultSet, palette: &Palette) -> Result<Analysis, AggregateError> {
    let agg = Aggregation::select(result)?;
    if result.is_empty() {
        return Err(AggregateError::NoRows);
    }
    debug!(
        "Aggregating {} row(s): dimension = {}, measure = {}",
        result.len(),
        agg.dimension,
        agg.measure
    );

    let mut entries = Vec::with_capacity(result.len());
    for (row_index, row) in result.rows().iter().enumerate() {
        let cell = &row[agg.measure_index];
        if cell.is_null() {
            continue;
        }
        let value = cell
            .as_number()
            .ok_or_else(|| AggregateError::NonNumericMeasure {
                column: agg.measure.clone(),
                row: row_index,
            })?;
        entries.push(Entry {
            label: row[agg.dimension_index].to_string(),
            value,
        });
    }

    let insights = summarize(&entries)
        .ok_or_else(|| AggregateError::NoNumericValues(agg.measure.clone()))?;
    let points = entries
        .iter()
        .map(|e| Point {
            label: e.label.clone(),
            value: e.value.as_f64(),
        })
        .collect();
    let chart = if agg.dimension == PROPORTION_DIMENSION {
        ChartSpec::proportion(&agg.dimension, points, palette)
    } else {
        ChartSpec::comparison(&agg.dimension, points, palette)
    };
    Ok(Analysis {
        chart,
        insights,
        table: Table::from(result),
    })
}

// Ties resolve to the earliest entry, so only strictly greater (or smaller)
// values replace the current extreme.
fn summarize(entries: &[Entry]) -> Option<InsightSet> {
    let first = entries.first()?;
    let mut total = Number::Integer(0);
    let mut max = first;
    let mut min = first;
    for entry in entries {
        total = total + entry.value;
        if entry.value > max.value {
            max = entry;
        }
        if entry.value < min.value {
            min = entry;
        }
    }
    Some(InsightSet {
        total,
        max: max.clone(),
        min: min.clone(),
    })
}
