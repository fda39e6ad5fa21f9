use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, ArrayRef, BooleanArray, Float64Array, Float64Builder, StringArray},
    compute::filter_record_batch,
    datatypes::{DataType, Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::sync::Arc;

use crate::load::utils::{is_numeric_label, parse_numeric};

pub const COUNTRY: &str = "Country";
pub const SERIES: &str = "Series";

/// One row per (country, indicator), one column per year. Cells are kept as
/// text; numeric views are coerced on demand.
#[derive(Debug, Clone)]
pub struct WideTable {
    batch: RecordBatch,
}

impl WideTable {
    /// Build from string rows. Empty cells become nulls.
    pub fn from_rows(headers: &[String], rows: &[Vec<String>]) -> Result<Self> {
        let fields: Vec<Field> = headers
            .iter()
            .map(|n| Field::new(n, DataType::Utf8, true))
            .collect();

        let columns: Vec<ArrayRef> = (0..headers.len())
            .map(|i| {
                let arr: StringArray = rows
                    .iter()
                    .map(|row| row.get(i).map(String::as_str).filter(|s| !s.is_empty()))
                    .collect();
                Arc::new(arr) as ArrayRef
            })
            .collect();

        // explicit row count so a table with every column dropped still has a height
        let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
        let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)
            .context("building wide table")?;
        Ok(Self { batch })
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Columns whose label is a year.
    pub fn year_columns(&self) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|n| is_numeric_label(n))
            .collect()
    }

    pub fn strings(&self, name: &str) -> Result<&StringArray> {
        let col = self
            .batch
            .column_by_name(name)
            .ok_or_else(|| anyhow!("column `{}` not found", name))?;
        col.as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| anyhow!("column `{}` is not a string column", name))
    }

    /// Text of one cell, `None` for a null.
    pub fn cell(&self, name: &str, row: usize) -> Result<Option<&str>> {
        let col = self.strings(name)?;
        if row >= col.len() {
            return Err(anyhow!("row {} out of range for `{}`", row, name));
        }
        Ok(if col.is_null(row) {
            None
        } else {
            Some(col.value(row))
        })
    }

    /// Numeric view of a column; tokens that do not parse become nulls.
    pub fn numeric(&self, name: &str) -> Result<Float64Array> {
        let sarr = self.strings(name)?;
        let mut b = Float64Builder::with_capacity(sarr.len());
        for opt in sarr.iter() {
            b.append_option(opt.and_then(parse_numeric));
        }
        Ok(b.finish())
    }

    /// Keep rows whose `Series` is one of `indicators`.
    pub fn filter_series(&self, indicators: &[String]) -> Result<Self> {
        self.filter_column(SERIES, indicators)
    }

    pub fn filter_column(&self, name: &str, allowed: &[String]) -> Result<Self> {
        let col = self.strings(name)?;
        let mask: BooleanArray = col
            .iter()
            .map(|v| Some(v.is_some_and(|s| allowed.iter().any(|a| a == s))))
            .collect();
        let batch = filter_record_batch(&self.batch, &mask)
            .with_context(|| format!("filtering rows on `{}`", name))?;
        Ok(Self { batch })
    }

    /// Distinct values of a string column in first-seen order.
    pub fn distinct(&self, name: &str) -> Result<Vec<String>> {
        let mut out: Vec<String> = Vec::new();
        for v in self.strings(name)?.iter().flatten() {
            if !out.iter().any(|o| o == v) {
                out.push(v.to_string());
            }
        }
        Ok(out)
    }

    /// First row for `country` + `series`.
    pub fn find_row(&self, country: &str, series: &str) -> Result<usize> {
        let countries = self.strings(COUNTRY)?;
        let all_series = self.strings(SERIES)?;
        (0..self.num_rows())
            .find(|&i| {
                countries.is_valid(i)
                    && all_series.is_valid(i)
                    && countries.value(i) == country
                    && all_series.value(i) == series
            })
            .ok_or_else(|| anyhow!("no row for country `{}` and series `{}`", country, series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Result<WideTable> {
        let headers: Vec<String> = ["Country", "Series", "2001", "2002"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = vec![
            vec!["Kenya", "Urban population", "100", ".."],
            vec!["Kenya", "Cereal yield (kg per hectare)", "1500.5", "1600"],
            vec!["Japan", "Urban population", "", "900"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();
        WideTable::from_rows(&headers, &rows)
    }

    #[test]
    fn numeric_view_coerces_and_keeps_length() -> Result<()> {
        let t = sample()?;
        let col = t.numeric("2002")?;
        assert_eq!(col.len(), 3);
        assert!(col.is_null(0));
        assert_eq!(col.value(1), 1600.0);
        assert_eq!(t.cell("2001", 2)?, None);
        Ok(())
    }

    #[test]
    fn filter_series_keeps_matching_rows() -> Result<()> {
        let t = sample()?;
        let urban = t.filter_series(&["Urban population".to_string()])?;
        assert_eq!(urban.num_rows(), 2);
        assert_eq!(urban.distinct(COUNTRY)?, vec!["Kenya", "Japan"]);
        Ok(())
    }

    #[test]
    fn lookups_name_the_missing_key() -> Result<()> {
        let t = sample()?;
        let err = t.strings("1999").unwrap_err();
        assert!(err.to_string().contains("1999"));
        let err = t.find_row("Italy", "Urban population").unwrap_err();
        assert!(err.to_string().contains("Italy"));
        assert_eq!(t.find_row("Japan", "Urban population")?, 2);
        Ok(())
    }

    #[test]
    fn year_columns_skip_labels() -> Result<()> {
        assert_eq!(sample()?.year_columns(), vec!["2001", "2002"]);
        Ok(())
    }

    #[test]
    fn empty_table_keeps_row_count() -> Result<()> {
        let t = WideTable::from_rows(&[], &[vec![], vec![]])?;
        assert_eq!(t.num_rows(), 2);
        assert!(t.column_names().is_empty());
        Ok(())
    }
}
