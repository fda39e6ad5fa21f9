// src/load/mod.rs
pub mod raw_table;
pub mod transpose;
pub mod utils;
pub mod wide;

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::config::CleaningConfig;
pub use raw_table::{read_raw_csv, read_raw_from, RawTable};
pub use transpose::{transpose, TransposedTable, YEARS};
pub use wide::{WideTable, COUNTRY, SERIES};

/// Drop the footer rows and configured columns, then shorten every
/// remaining label to its first space-separated token.
#[tracing::instrument(level = "info", skip_all, fields(rows = raw.rows.len(), columns = raw.headers.len()))]
pub fn clean(raw: &RawTable, cfg: &CleaningConfig) -> Result<WideTable> {
    for drop in &cfg.drop_columns {
        if !raw.headers.iter().any(|h| h == drop) {
            return Err(anyhow!("column `{}` not found in CSV header", drop));
        }
    }

    let keep: Vec<usize> = (0..raw.headers.len())
        .filter(|&i| !cfg.drop_columns.contains(&raw.headers[i]))
        .collect();

    let headers: Vec<String> = keep
        .iter()
        .map(|&i| utils::short_label(&raw.headers[i]).to_string())
        .collect();

    let data_rows = raw.rows.len().saturating_sub(cfg.footer_rows);
    let rows: Vec<Vec<String>> = raw.rows[..data_rows]
        .iter()
        .map(|row| {
            keep.iter()
                .map(|&i| row.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    debug!(kept = headers.len(), dropped = cfg.drop_columns.len(), "columns");
    info!(rows = rows.len(), "cleaned");
    WideTable::from_rows(&headers, &rows)
}

/// Read, clean and transpose in one go.
pub fn load_and_clean(path: &Path, cfg: &CleaningConfig) -> Result<(WideTable, TransposedTable)> {
    let raw = read_raw_csv(path)?;
    let wide = clean(&raw, cfg)?;
    let transposed = transpose(&wide)?;
    Ok((wide, transposed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Header in the World Bank layout, 1990..=2022.
    fn header() -> Vec<String> {
        let mut h = vec![
            "Country".to_string(),
            "Country Code".to_string(),
            "Series".to_string(),
            "Series Code".to_string(),
        ];
        h.extend((1990..=2022).map(|y| format!("{y} [YR{y}]")));
        h
    }

    fn raw_with(data_rows: usize, footer: usize) -> RawTable {
        let headers = header();
        let width = headers.len();
        let mut rows = Vec::new();
        for i in 0..data_rows {
            let mut r = vec![
                format!("Country{i}"),
                format!("C{i}"),
                "Urban population".to_string(),
                "SP.URB.TOTL".to_string(),
            ];
            r.extend((0..width - 4).map(|j| (i * 100 + j).to_string()));
            rows.push(r);
        }
        for i in 0..footer {
            let mut r = vec![format!("footer {i}")];
            r.resize(width, String::new());
            rows.push(r);
        }
        RawTable { headers, rows }
    }

    #[test]
    fn clean_drops_footer_and_fixed_columns() -> Result<()> {
        let raw = raw_with(3, 10);
        let wide = clean(&raw, &CleaningConfig::default())?;
        assert_eq!(wide.num_rows(), 3);

        let names = wide.column_names();
        // 4 label columns + 33 years, minus 2 codes and 10 years
        assert_eq!(names.len(), 37 - 12);
        assert_eq!(&names[..3], &["Country", "Series", "1991"]);
        assert_eq!(names.last().map(String::as_str), Some("2013"));
        for gone in ["1990", "2014", "2018", "2022"] {
            assert!(!names.iter().any(|n| n == gone), "{gone} should be dropped");
        }
        // the code columns are gone, so the truncated labels stay unique
        assert_eq!(names.iter().filter(|n| *n == "Country").count(), 1);
        assert_eq!(names.iter().filter(|n| *n == "Series").count(), 1);
        Ok(())
    }

    #[test]
    fn fewer_rows_than_footer_is_empty() -> Result<()> {
        let raw = raw_with(0, 4);
        let wide = clean(&raw, &CleaningConfig::default())?;
        assert_eq!(wide.num_rows(), 0);
        Ok(())
    }

    #[test]
    fn missing_drop_column_is_named() {
        let mut raw = raw_with(1, 10);
        raw.headers.retain(|h| h != "2016 [YR2016]");
        for r in &mut raw.rows {
            r.pop();
        }
        let err = clean(&raw, &CleaningConfig::default()).unwrap_err();
        assert!(err.to_string().contains("2016 [YR2016]"));
    }

    #[test]
    fn short_rows_read_as_empty_cells() -> Result<()> {
        let mut raw = raw_with(2, 10);
        raw.rows[0].truncate(3);
        let wide = clean(&raw, &CleaningConfig::default())?;
        assert_eq!(wide.num_rows(), 2);
        assert_eq!(wide.cell("Series", 0)?, Some("Urban population"));
        assert_eq!(wide.cell("2001", 0)?, None);
        assert_eq!(wide.cell("2001", 1)?, Some("111"));
        Ok(())
    }

    #[test]
    fn transpose_after_clean_has_one_row_per_year() -> Result<()> {
        let wide = clean(&raw_with(2, 10), &CleaningConfig::default())?;
        let t = transpose(&wide)?;
        assert_eq!(t.num_rows(), wide.year_columns().len());
        assert_eq!(t.index.first(), Some(&1991));
        assert_eq!(t.columns, vec!["Country0", "Country1", YEARS]);
        Ok(())
    }

    #[test]
    fn csv_text_to_wide_table() -> Result<()> {
        let text = "Country,Series,2001 [YR2001]\nKenya,Urban population,5\nLast Updated: 12/18/2023\n";
        let raw = read_raw_from(Cursor::new(text))?;
        let cfg = CleaningConfig {
            footer_rows: 1,
            drop_columns: Vec::new(),
        };
        let wide = clean(&raw, &cfg)?;
        assert_eq!(wide.column_names(), vec!["Country", "Series", "2001"]);
        assert_eq!(wide.num_rows(), 1);
        Ok(())
    }
}
