use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::frame::{floats, texts, to_frame};
use crate::load::{WideTable, SERIES};

/// Statistic names in output order.
pub const DESCRIBE_STATS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Count, mean, sample std, min, quartiles and max of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    /// Values in [`DESCRIBE_STATS`] order.
    pub fn values(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }
}

/// Grouped describe: `cells[indicator][year]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub indicators: Vec<String>,
    pub years: Vec<String>,
    pub cells: Vec<Vec<Describe>>,
}

impl SummaryTable {
    pub fn num_rows(&self) -> usize {
        self.indicators.len()
    }

    /// Flattened columns, one per (year, statistic), e.g. `"2001 mean"`.
    pub fn columns(&self) -> Vec<(String, Vec<Option<f64>>)> {
        let mut out = Vec::with_capacity(self.years.len() * DESCRIBE_STATS.len());
        for (y, year) in self.years.iter().enumerate() {
            for (s, stat) in DESCRIBE_STATS.iter().enumerate() {
                let col = self.cells.iter().map(|row| row[y].values()[s]).collect();
                out.push((format!("{} {}", year, stat), col));
            }
        }
        out
    }
}

fn stat_exprs(year: &str) -> [Expr; 8] {
    let c = || col(year);
    let q = |p: f64| c().quantile(lit(p), QuantileMethod::Linear);
    [
        c().count(),
        c().mean(),
        c().std(1),
        c().min(),
        q(0.25),
        q(0.5),
        q(0.75),
        c().max(),
    ]
}

/// Group rows by `Series` and describe every year column. Groups come out
/// sorted by indicator name; rows without a series are ignored.
#[tracing::instrument(level = "info", skip_all, fields(rows = table.num_rows()))]
pub fn describe_by_series(table: &WideTable) -> Result<SummaryTable> {
    let years = table.year_columns();
    let aggs: Vec<Expr> = years
        .iter()
        .flat_map(|y| {
            stat_exprs(y)
                .into_iter()
                .zip(DESCRIBE_STATS)
                .map(move |(e, stat)| e.alias(format!("{} {}", y, stat)))
        })
        .collect();

    let grouped = to_frame(table, &years)?
        .lazy()
        .filter(col(SERIES).is_not_null())
        .group_by([col(SERIES)])
        .agg(aggs)
        .sort([SERIES], SortMultipleOptions::default())
        .collect()?;

    let indicators = texts(&grouped, SERIES)?;
    let mut cells = vec![Vec::with_capacity(years.len()); indicators.len()];
    for year in &years {
        let mut stats = Vec::with_capacity(DESCRIBE_STATS.len());
        for stat in DESCRIBE_STATS {
            stats.push(floats(&grouped, &format!("{} {}", year, stat))?);
        }
        for (g, row) in cells.iter_mut().enumerate() {
            row.push(Describe {
                count: stats[0][g].unwrap_or(0.0) as usize,
                mean: stats[1][g],
                std: stats[2][g],
                min: stats[3][g],
                q25: stats[4][g],
                q50: stats[5][g],
                q75: stats[6][g],
                max: stats[7][g],
            });
        }
    }
    for (name, row) in indicators.iter().zip(&cells) {
        debug!(indicator = %name, years = row.len(), "described");
    }

    Ok(SummaryTable {
        indicators,
        years,
        cells,
    })
}
