use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wdi_trends::{config::AnalysisConfig, pipeline, report};

/// Summary statistics and charts for a World Bank indicator export.
#[derive(Debug, Parser)]
#[command(name = "wdi-trends", version)]
struct Cli {
    /// YAML analysis config; built-in defaults when omitted.
    #[arg(short, long, env = "WDI_TRENDS_CONFIG")]
    config: Option<PathBuf>,

    /// CSV export to read (overrides the config).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for charts and summary.json (overrides the config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Compute statistics only.
    #[arg(long)]
    no_plots: bool,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    // stderr, so stdout carries only the report
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) resolve config ───────────────────────────────────────────
    let cli = Cli::parse();
    let mut cfg = AnalysisConfig::load(cli.config.as_deref())?;
    if let Some(input) = cli.input {
        cfg.input = input;
    }
    if let Some(dir) = cli.output_dir {
        cfg.output_dir = dir;
    }
    info!(input = %cfg.input.display(), output = %cfg.output_dir.display(), "startup");

    // ─── 3) run ──────────────────────────────────────────────────────
    let outcome = pipeline::run(&cfg, !cli.no_plots)?;

    report::print_console(&outcome.report(&cfg.input));

    info!(report = %outcome.report_path.display(), "all done");
    Ok(())
}
