//! Descriptive statistics and charts for World Bank indicator exports.
//!
//! The pipeline reads a "World Development Indicators" CSV, drops footer
//! rows and unwanted columns, reshapes it into a wide and a year-indexed
//! table, summarises the selected indicators and renders PNG charts.

pub mod config;
pub mod load;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod stats;
