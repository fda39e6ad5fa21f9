use anyhow::{Context, Result};
use polars::prelude::*;

use crate::load::{WideTable, COUNTRY, SERIES};

/// Polars view of the wide table: `Country` and `Series` as text, each of
/// `years` coerced to Float64 (unparseable cells are null).
pub fn to_frame(table: &WideTable, years: &[String]) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(years.len() + 2);
    for name in [COUNTRY, SERIES] {
        let values: Vec<Option<&str>> = table.strings(name)?.iter().collect();
        columns.push(Column::new(name.into(), values));
    }
    for year in years {
        let values: Vec<Option<f64>> = table.numeric(year)?.iter().collect();
        columns.push(Column::new(year.as_str().into(), values));
    }
    DataFrame::new(columns).context("building data frame")
}

/// One column of `df` as optional floats, casting counts and the like.
pub(crate) fn floats(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = df
        .column(name)
        .with_context(|| format!("column `{}` missing from frame", name))?
        .cast(&DataType::Float64)?;
    Ok(col.f64()?.into_iter().collect())
}

/// One text column of `df`; nulls read as empty strings.
pub(crate) fn texts(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let col = df
        .column(name)
        .with_context(|| format!("column `{}` missing from frame", name))?;
    Ok(col
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}
