// src/report/mod.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use prettytable::{format, Cell, Row, Table};
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

use crate::stats::{ColumnStat, CorrelationMatrix, PointStats, SummaryTable, DESCRIBE_STATS};

/// Everything one run computed, as written to `summary.json`.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub input: &'a Path,
    pub cleaned_rows: usize,
    pub selected_rows: usize,
    pub transposed_years: usize,
    pub summary: &'a SummaryTable,
    pub skew: &'a [ColumnStat],
    pub kurt: &'a [ColumnStat],
    pub point: &'a PointStats,
    pub correlation: &'a CorrelationMatrix,
    pub plots: &'a [PathBuf],
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "NaN".to_string(), |v| format!("{:.6}", v))
}

/// Grouped describe as a box table, one line per (indicator, year).
pub fn summary_table(summary: &SummaryTable) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    let mut header = vec![
        Cell::new("Series").style_spec("bFg"),
        Cell::new("Year").style_spec("bFg"),
    ];
    header.extend(DESCRIBE_STATS.iter().map(|s| Cell::new(s).style_spec("bFg")));
    table.add_row(Row::new(header));

    for (indicator, row) in summary.indicators.iter().zip(&summary.cells) {
        for (year, d) in summary.years.iter().zip(row) {
            let mut cells = vec![Cell::new(indicator), Cell::new(year)];
            cells.push(Cell::new(&d.count.to_string()).style_spec("r"));
            cells.extend(
                d.values()
                    .iter()
                    .skip(1)
                    .map(|v| Cell::new(&fmt_opt(*v)).style_spec("r")),
            );
            table.add_row(Row::new(cells));
        }
    }
    table
}

/// `title` followed by one `column  value` line per entry.
pub fn format_column_stats(title: &str, stats: &[ColumnStat]) -> String {
    let width = stats.iter().map(|s| s.column.len()).max().unwrap_or(0);
    let mut out = format!("{}\n", title);
    for s in stats {
        out.push_str(&format!("{:<width$}    {}\n", s.column, fmt_opt(s.value), width = width));
    }
    out
}

pub fn format_point_stats(p: &PointStats) -> String {
    format!(
        "Mean value: {}\nMedian value: {}\nStandard Deviation: {}\n",
        fmt_opt(p.mean),
        fmt_opt(p.median),
        fmt_opt(p.std_dev)
    )
}

/// Print the run's statistics to stdout.
pub fn print_console(report: &RunReport<'_>) {
    println!("\n--- Summary Statistics ---");
    summary_table(report.summary).printstd();
    print!("{}", format_column_stats("Skew value:", report.skew));
    print!("{}", format_column_stats("Kurt value:", report.kurt));
    print!("{}", format_point_stats(report.point));
}

pub fn write_json(report: &RunReport<'_>, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating report {}", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, report)
        .with_context(|| format!("writing report {}", path.display()))?;
    w.flush()
        .with_context(|| format!("flushing report {}", path.display()))?;
    info!(path = %path.display(), "wrote report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Describe;
    use tempfile::tempdir;

    fn summary() -> SummaryTable {
        SummaryTable {
            indicators: vec!["Urban population".into()],
            years: vec!["2001".into()],
            cells: vec![vec![Describe {
                count: 2,
                mean: Some(2.0),
                std: Some(std::f64::consts::SQRT_2),
                min: Some(1.0),
                q25: Some(1.5),
                q50: Some(2.0),
                q75: Some(2.5),
                max: Some(3.0),
            }]],
        }
    }

    #[test]
    fn console_lines() {
        let stats = vec![
            ColumnStat {
                column: "2001 count".into(),
                value: Some(0.0),
            },
            ColumnStat {
                column: "2001 mean".into(),
                value: None,
            },
        ];
        let text = format_column_stats("Skew value:", &stats);
        assert_eq!(
            text,
            "Skew value:\n2001 count    0.000000\n2001 mean     NaN\n"
        );

        let p = PointStats {
            year: "2001".into(),
            mean: Some(2.0),
            median: Some(2.0),
            std_dev: None,
        };
        assert!(format_point_stats(&p).contains("Standard Deviation: NaN"));
    }

    #[test]
    fn summary_table_has_a_line_per_indicator_year() {
        let t = summary_table(&summary());
        assert_eq!(t.len(), 2);
        let text = t.to_string();
        assert!(text.contains("Urban population"));
        assert!(text.contains("2.000000"));
    }

    #[test]
    fn json_report_round_trips_as_json() -> Result<()> {
        let dir = tempdir()?;
        let s = summary();
        let point = PointStats {
            year: "2001".into(),
            mean: Some(2.0),
            median: Some(2.0),
            std_dev: Some(1.0),
        };
        let corr = CorrelationMatrix {
            labels: vec!["Urban population".into()],
            values: vec![vec![None]],
        };
        let report = RunReport {
            generated_at: Utc::now(),
            input: Path::new("wdi.csv"),
            cleaned_rows: 1,
            selected_rows: 1,
            transposed_years: 1,
            summary: &s,
            skew: &[],
            kurt: &[],
            point: &point,
            correlation: &corr,
            plots: &[],
        };
        let path = dir.path().join("summary.json");
        write_json(&report, &path)?;

        let v: serde_json::Value = serde_json::from_reader(File::open(&path)?)?;
        assert_eq!(v["cleaned_rows"], 1);
        assert_eq!(v["summary"]["indicators"][0], "Urban population");
        assert_eq!(v["point"]["std_dev"], 1.0);
        assert!(v["correlation"]["values"][0][0].is_null());
        Ok(())
    }
}
