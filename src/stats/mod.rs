// src/stats/mod.rs
pub mod correlation;
pub mod describe;
pub mod frame;
pub mod moments;
pub mod point;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

pub use correlation::{pivot, pivot_correlation, CorrelationMatrix, Pivot};
pub use describe::{describe_by_series, Describe, SummaryTable, DESCRIBE_STATS};
pub use frame::to_frame;
pub use point::{selected_data_stats, PointStats};

/// One value per summary column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStat {
    pub column: String,
    pub value: Option<f64>,
}

fn per_column(
    summary: &SummaryTable,
    f: fn(&[f64]) -> Result<Option<f64>>,
) -> Result<Vec<ColumnStat>> {
    summary
        .columns()
        .into_iter()
        .map(|(column, cells)| {
            let present: Vec<f64> = cells.into_iter().flatten().collect();
            Ok(ColumnStat {
                value: f(&present)?,
                column,
            })
        })
        .collect()
}

/// Skewness of each column of the grouped describe output. This runs over
/// the per-indicator statistics, not the raw observations.
pub fn skew(summary: &SummaryTable) -> Result<Vec<ColumnStat>> {
    let out = per_column(summary, moments::skewness)?;
    info!(
        columns = out.len(),
        defined = out.iter().filter(|c| c.value.is_some()).count(),
        "skew"
    );
    Ok(out)
}

/// Excess kurtosis of each describe column; see [`skew`].
pub fn kurt(summary: &SummaryTable) -> Result<Vec<ColumnStat>> {
    let out = per_column(summary, moments::kurtosis)?;
    info!(
        columns = out.len(),
        defined = out.iter().filter(|c| c.value.is_some()).count(),
        "kurt"
    );
    Ok(out)
}
