use anyhow::{anyhow, Result};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use super::frame::{floats, texts, to_frame};
use crate::load::{WideTable, COUNTRY, SERIES};

/// Square matrix of pairwise Pearson coefficients; `None` where a pair has
/// fewer than two complete observations or no variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.values[i][j]
    }
}

/// Country × indicator matrix for `years`, mean of duplicate cells.
/// Columns with no values at all are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    pub countries: Vec<String>,
    pub labels: Vec<String>,
    /// Column-major, `columns[label][country]`.
    pub columns: Vec<Vec<Option<f64>>>,
}

pub fn pivot(table: &WideTable, years: &[String]) -> Result<Pivot> {
    if years.is_empty() {
        return Err(anyhow!("no years selected for the pivot"));
    }
    let grouped = to_frame(table, years)?
        .lazy()
        .filter(col(COUNTRY).is_not_null().and(col(SERIES).is_not_null()))
        .group_by([col(COUNTRY), col(SERIES)])
        .agg(years.iter().map(|y| col(y.as_str()).mean()).collect::<Vec<_>>())
        .sort([COUNTRY, SERIES], SortMultipleOptions::default())
        .collect()?;

    let country_of = texts(&grouped, COUNTRY)?;
    let series_of = texts(&grouped, SERIES)?;
    let mut countries = country_of.clone();
    countries.dedup();
    let mut series = series_of.clone();
    series.sort();
    series.dedup();

    let row_of: HashMap<(&str, &str), usize> = country_of
        .iter()
        .zip(&series_of)
        .enumerate()
        .map(|(g, (c, s))| ((s.as_str(), c.as_str()), g))
        .collect();

    let mut labels = Vec::new();
    let mut columns = Vec::new();
    for year in years {
        let means = floats(&grouped, year)?;
        for s in &series {
            let cells: Vec<Option<f64>> = countries
                .iter()
                .map(|c| {
                    row_of
                        .get(&(s.as_str(), c.as_str()))
                        .and_then(|&g| means[g])
                })
                .collect();
            if cells.iter().all(Option::is_none) {
                debug!(series = %s, year = %year, "pivot column empty, dropped");
                continue;
            }
            labels.push(format!("{} {}", year, s));
            columns.push(cells);
        }
    }

    Ok(Pivot {
        countries,
        labels,
        columns,
    })
}

/// Pivot the selected rows and correlate the indicator columns.
#[tracing::instrument(level = "info", skip(table), fields(rows = table.num_rows()))]
pub fn pivot_correlation(table: &WideTable, years: &[String]) -> Result<CorrelationMatrix> {
    let p = pivot(table, years)?;
    let n = p.labels.len();
    let mut values = vec![vec![None; n]; n];
    if n == 0 {
        return Ok(CorrelationMatrix {
            labels: p.labels,
            values,
        });
    }

    let name = |i: usize| format!("c{}", i);
    let frame = DataFrame::new(
        p.columns
            .iter()
            .enumerate()
            .map(|(i, c)| Column::new(name(i).into(), c.as_slice()))
            .collect(),
    )?;
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();
    let coefs = frame
        .lazy()
        .select(
            pairs
                .iter()
                .map(|&(i, j)| {
                    pearson_corr(col(name(i)), col(name(j))).alias(format!("{}_{}", i, j))
                })
                .collect::<Vec<_>>(),
        )
        .collect()?;

    for &(i, j) in &pairs {
        // NaN marks fewer than two complete pairs or a constant column
        let r = floats(&coefs, &format!("{}_{}", i, j))?
            .first()
            .copied()
            .flatten()
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(-1.0, 1.0));
        values[i][j] = r;
        values[j][i] = r;
    }

    Ok(CorrelationMatrix {
        labels: p.labels,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Result<WideTable> {
        let headers: Vec<String> = ["Country", "Series", "2001", "2002"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = vec![
            vec!["Kenya", "A", "1", "5"],
            vec!["Kenya", "B", "2", ".."],
            vec!["Japan", "A", "2", "6"],
            vec!["Japan", "B", "4", ".."],
            vec!["Italy", "A", "3", "7"],
            vec!["Italy", "B", "5", ".."],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();
        WideTable::from_rows(&headers, &rows)
    }

    #[test]
    fn single_year_labels_keep_the_year() -> Result<()> {
        let m = pivot_correlation(&table()?, &["2001".to_string()])?;
        assert_eq!(m.labels, vec!["2001 A", "2001 B"]);
        assert!((m.get("2001 A", "2001 A").expect("diagonal") - 1.0).abs() < 1e-12);
        // Italy 3/5, Japan 2/4, Kenya 1/2
        let r = m.get("2001 A", "2001 B").expect("defined");
        assert!((r - 0.9819805060619657).abs() < 1e-9);
        assert_eq!(m.get("2001 A", "2001 B"), m.get("2001 B", "2001 A"));
        Ok(())
    }

    #[test]
    fn constant_and_sparse_pairs_are_undefined() -> Result<()> {
        let headers: Vec<String> = ["Country", "Series", "2001"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = vec![
            vec!["Kenya", "A", "1"],
            vec!["Kenya", "Flat", "4"],
            vec!["Kenya", "Sparse", "9"],
            vec!["Japan", "A", "2"],
            vec!["Japan", "Flat", "4"],
            vec!["Japan", "Sparse", ".."],
            vec!["Italy", "A", "3"],
            vec!["Italy", "Flat", "4"],
            vec!["Italy", "Sparse", ".."],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();
        let m = pivot_correlation(&WideTable::from_rows(&headers, &rows)?, &["2001".to_string()])?;
        assert_eq!(m.labels, vec!["2001 A", "2001 Flat", "2001 Sparse"]);
        assert_eq!(m.get("2001 A", "2001 Flat"), None);
        assert_eq!(m.get("2001 A", "2001 Sparse"), None);
        Ok(())
    }

    #[test]
    fn duplicate_cells_are_averaged() -> Result<()> {
        let headers: Vec<String> = ["Country", "Series", "2001"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = vec![
            vec!["Kenya", "A", "1"],
            vec!["Kenya", "A", "3"],
            vec!["Japan", "A", "5"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();
        let p = pivot(&WideTable::from_rows(&headers, &rows)?, &["2001".to_string()])?;
        assert_eq!(p.countries, vec!["Japan", "Kenya"]);
        assert_eq!(p.columns, vec![vec![Some(5.0), Some(2.0)]]);
        Ok(())
    }

    #[test]
    fn empty_columns_are_dropped() -> Result<()> {
        let p = pivot(&table()?, &["2001".to_string(), "2002".to_string()])?;
        assert_eq!(p.countries, vec!["Italy", "Japan", "Kenya"]);
        assert_eq!(p.labels, vec!["2001 A", "2001 B", "2002 A"]);
        assert_eq!(p.columns[2], vec![Some(7.0), Some(6.0), Some(5.0)]);
        Ok(())
    }

    #[test]
    fn missing_year_is_an_error() -> Result<()> {
        assert!(pivot_correlation(&table()?, &["1999".to_string()]).is_err());
        assert!(pivot_correlation(&table()?, &[]).is_err());
        Ok(())
    }
}
