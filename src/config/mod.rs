// src/config/mod.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Every selection the analysis makes. Defaults reproduce the stock
/// World Bank run (four indicators, 2001 as the reference year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub cleaning: CleaningConfig,
    /// Indicators kept in the selected subset.
    pub indicators: Vec<String>,
    /// Year column used for mean / median / std.
    pub stats_year: String,
    pub correlation_years: Vec<String>,
    pub bars: BarsConfig,
    pub lines: LinesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleaningConfig {
    /// Footer rows at the end of the export (source notes, blanks).
    pub footer_rows: usize,
    pub drop_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BarsConfig {
    pub years: Vec<String>,
    pub sort_year: String,
    pub bar_width: f64,
    pub file_name: String,
    pub panels: Vec<BarPanel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BarPanel {
    pub indicator: String,
    pub title: String,
    pub y_label: String,
    /// One colour per year, by name ("blue") or hex ("#1f77b4").
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinesConfig {
    pub countries: Vec<String>,
    pub years: Vec<String>,
    pub panels: Vec<LinePanel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinePanel {
    pub indicator: String,
    pub title: String,
    pub y_label: String,
    pub file_name: String,
    pub marker: Marker,
    /// One colour per country; empty uses the default palette.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Fixed number of decimals on y tick labels.
    #[serde(default)]
    pub y_decimals: Option<usize>,
    #[serde(default)]
    pub legend: LegendCorner,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendCorner {
    #[default]
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Diamond,
    Triangle,
    Circle,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("World Bank Data - Series - Metadata.csv"),
            output_dir: PathBuf::from("plots"),
            cleaning: CleaningConfig::default(),
            indicators: strings(&[
                "Agricultural land (sq. km)",
                "Cereal yield (kg per hectare)",
                "Urban population",
                "Methane emissions (% change from 1990)",
            ]),
            stats_year: "2001".into(),
            correlation_years: strings(&["2001"]),
            bars: BarsConfig::default(),
            lines: LinesConfig::default(),
        }
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            footer_rows: 10,
            drop_columns: strings(&[
                "Country Code",
                "Series Code",
                "1990 [YR1990]",
                "2014 [YR2014]",
                "2015 [YR2015]",
                "2016 [YR2016]",
                "2017 [YR2017]",
                "2018 [YR2018]",
                "2019 [YR2019]",
                "2020 [YR2020]",
                "2021 [YR2021]",
                "2022 [YR2022]",
            ]),
        }
    }
}

impl Default for BarsConfig {
    fn default() -> Self {
        Self {
            years: strings(&["1998", "1999", "2000", "2001", "2002"]),
            sort_year: "2001".into(),
            bar_width: 0.09,
            file_name: "agricultural_and_cereal.png".into(),
            panels: vec![
                BarPanel {
                    indicator: "Agricultural land (sq. km)".into(),
                    title: "Agricultural Land across Countries".into(),
                    y_label: "Agricultural Land (sq. km)".into(),
                    colors: strings(&["blue", "green", "orange", "red", "purple"]),
                },
                BarPanel {
                    indicator: "Cereal yield (kg per hectare)".into(),
                    title: "Cereal yield across Countries".into(),
                    y_label: "Cereal yield (kg per hectare)".into(),
                    colors: strings(&["cyan", "magenta", "yellow", "black", "pink"]),
                },
            ],
        }
    }
}

impl Default for LinesConfig {
    fn default() -> Self {
        Self {
            countries: strings(&["Japan", "Kenya", "Finland", "Italy"]),
            years: strings(&["2001", "2002", "2003", "2004"]),
            panels: vec![
                LinePanel {
                    indicator: "Urban population".into(),
                    title: "Urban Population across Countries".into(),
                    y_label: "Urban Population".into(),
                    file_name: "urban_population.png".into(),
                    marker: Marker::Diamond,
                    colors: Vec::new(),
                    y_decimals: None,
                    legend: LegendCorner::UpperLeft,
                },
                LinePanel {
                    indicator: "Methane emissions (% change from 1990)".into(),
                    title: "Methane Emissions".into(),
                    y_label: "Methane Emissions (% change from 1990)".into(),
                    file_name: "methane_emissions.png".into(),
                    marker: Marker::Triangle,
                    colors: strings(&["cyan", "yellow", "black", "magenta"]),
                    y_decimals: Some(2),
                    legend: LegendCorner::LowerRight,
                },
            ],
        }
    }
}

impl AnalysisConfig {
    /// Load a YAML config. Fields the file leaves out keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // an empty document deserialises to unit, not a map
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("invalid analysis config")
    }

    /// Config file if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_yaml_file(p),
            None => Ok(Self::default()),
        }
    }
}
