use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use super::frame::to_frame;
use crate::load::WideTable;

/// Mean, median and population standard deviation of one year column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointStats {
    pub year: String,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
}

/// Coerce `year` to numbers (unparseable cells become missing and are
/// skipped) and summarise what is left.
pub fn selected_data_stats(table: &WideTable, year: &str) -> Result<PointStats> {
    let df = to_frame(table, &[year.to_string()])?;
    let values = df.column(year)?.as_materialized_series();

    let stats = PointStats {
        year: year.to_string(),
        mean: values.mean(),
        median: values.median(),
        std_dev: values.std(0),
    };
    let missing = values.null_count();
    info!(
        year,
        present = values.len() - missing,
        missing,
        mean = ?stats.mean,
        median = ?stats.median,
        std_dev = ?stats.std_dev,
        "point statistics"
    );
    Ok(stats)
}
