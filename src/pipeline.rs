// src/pipeline.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{info, warn};

use crate::{
    config::AnalysisConfig,
    load::{self, TransposedTable, WideTable},
    plot, report,
    stats::{self, ColumnStat, CorrelationMatrix, PointStats, SummaryTable},
};

/// Statistics derived from the cleaned table; no I/O.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub selected: WideTable,
    pub summary: SummaryTable,
    pub skew: Vec<ColumnStat>,
    pub kurt: Vec<ColumnStat>,
    pub point: PointStats,
    pub correlation: CorrelationMatrix,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub generated_at: DateTime<Utc>,
    pub wide: WideTable,
    pub transposed: TransposedTable,
    pub analysis: Analysis,
    pub plots: Vec<PathBuf>,
    pub report_path: PathBuf,
}

impl RunOutcome {
    pub fn report<'a>(&'a self, input: &'a Path) -> report::RunReport<'a> {
        report::RunReport {
            generated_at: self.generated_at,
            input,
            cleaned_rows: self.wide.num_rows(),
            selected_rows: self.analysis.selected.num_rows(),
            transposed_years: self.transposed.num_rows(),
            summary: &self.analysis.summary,
            skew: &self.analysis.skew,
            kurt: &self.analysis.kurt,
            point: &self.analysis.point,
            correlation: &self.analysis.correlation,
            plots: &self.plots,
        }
    }
}

/// Subset → grouped describe → skew / kurt → point stats → correlation.
pub fn analyse(wide: &WideTable, cfg: &AnalysisConfig) -> Result<Analysis> {
    let selected = wide
        .filter_series(&cfg.indicators)
        .context("selecting indicators")?;
    info!(rows = selected.num_rows(), "selected indicators");

    let summary = stats::describe_by_series(&selected)?;
    let skew = stats::skew(&summary)?;
    let kurt = stats::kurt(&summary)?;
    let point = stats::selected_data_stats(&selected, &cfg.stats_year)
        .with_context(|| format!("point statistics for {}", cfg.stats_year))?;
    let correlation = stats::pivot_correlation(&selected, &cfg.correlation_years)
        .context("correlation matrix")?;

    Ok(Analysis {
        selected,
        summary,
        skew,
        kurt,
        point,
        correlation,
    })
}

/// Heatmap from the selected rows; bars and lines from the full table.
pub fn render_all(
    wide: &WideTable,
    analysis: &Analysis,
    cfg: &AnalysisConfig,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let heatmap_path = out_dir.join("correlation_heatmap.png");
    plot::render_heatmap(&analysis.correlation, &heatmap_path)?;
    written.push(heatmap_path);

    let bar_groups = cfg
        .bars
        .panels
        .iter()
        .map(|p| {
            plot::prepare_bar_panel(wide, p, &cfg.bars.years, &cfg.bars.sort_year)
                .map(|g| (g, p))
        })
        .collect::<Result<Vec<_>>>()?;
    if bar_groups.is_empty() {
        warn!("no bar panels configured");
    } else {
        let bars_path = out_dir.join(&cfg.bars.file_name);
        plot::render_bars(&bar_groups, cfg.bars.bar_width, &bars_path)?;
        written.push(bars_path);
    }

    for panel in &cfg.lines.panels {
        let chart = plot::prepare_line_panel(wide, panel, &cfg.lines.countries, &cfg.lines.years)?;
        let path = out_dir.join(&panel.file_name);
        plot::render_lines(&chart, panel, &path)?;
        written.push(path);
    }

    for p in &written {
        info!(path = %p.display(), "wrote plot");
    }
    Ok(written)
}

/// load → clean → reshape → describe → plot, then `summary.json`.
pub fn run(cfg: &AnalysisConfig, render_plots: bool) -> Result<RunOutcome> {
    let start = Instant::now();
    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating output directory {}", cfg.output_dir.display()))?;

    let (wide, transposed) = load::load_and_clean(&cfg.input, &cfg.cleaning)
        .with_context(|| format!("loading {}", cfg.input.display()))?;
    info!(
        rows = wide.num_rows(),
        years = transposed.num_rows(),
        "loaded and reshaped"
    );

    let analysis = analyse(&wide, cfg)?;

    let plots = if render_plots {
        render_all(&wide, &analysis, cfg, &cfg.output_dir)?
    } else {
        Vec::new()
    };

    let outcome = RunOutcome {
        generated_at: Utc::now(),
        wide,
        transposed,
        analysis,
        plots,
        report_path: cfg.output_dir.join("summary.json"),
    };
    report::write_json(&outcome.report(&cfg.input), &outcome.report_path)?;

    info!(elapsed = ?start.elapsed(), plots = outcome.plots.len(), "run complete");
    Ok(outcome)
}
