use anyhow::{anyhow, Context, Result};
use arrow::array::Array;

use crate::load::utils::is_numeric_label;
use crate::load::wide::WideTable;

pub const YEARS: &str = "Years";

/// Year-indexed view of a [`WideTable`]: one row per numeric column label,
/// one column per original row (labelled by that row's first cell), plus a
/// trailing `Years` column that repeats the index.
#[derive(Debug, Clone, PartialEq)]
pub struct TransposedTable {
    pub index: Vec<i64>,
    pub columns: Vec<String>,
    /// Row-major, `cells[row][col]`.
    pub cells: Vec<Vec<Option<String>>>,
}

impl TransposedTable {
    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    /// Cells of the first column named `name`.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.cells.iter().map(|r| r[idx].as_deref()).collect())
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(rows = wide.num_rows()))]
pub fn transpose(wide: &WideTable) -> Result<TransposedTable> {
    let names = wide.column_names();
    let label_col = names
        .first()
        .ok_or_else(|| anyhow!("cannot transpose a table without columns"))?;

    let labels = wide.strings(label_col)?;
    let mut columns: Vec<String> = (0..labels.len())
        .map(|i| {
            if labels.is_null(i) {
                String::new()
            } else {
                labels.value(i).to_string()
            }
        })
        .collect();
    columns.push(YEARS.to_string());

    let mut index = Vec::new();
    let mut cells = Vec::new();
    for name in names.iter().skip(1).filter(|n| is_numeric_label(n)) {
        let year: i64 = name
            .parse()
            .with_context(|| format!("year label `{}` is not an integer", name))?;
        let col = wide.strings(name)?;
        let mut row: Vec<Option<String>> = col.iter().map(|v| v.map(str::to_string)).collect();
        row.push(Some(year.to_string()));
        index.push(year);
        cells.push(row);
    }

    Ok(TransposedTable {
        index,
        columns,
        cells,
    })
}
