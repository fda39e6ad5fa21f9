use anyhow::Context;
use plotters::prelude::*;
use std::path::Path;

use super::{color_at, padded_range, PlotError, Result};
use crate::config::{LegendCorner, LinePanel, Marker};
use crate::load::{utils::parse_numeric, WideTable};

/// One indicator over the selected years, a line per country.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub indicator: String,
    pub years: Vec<f64>,
    /// `(country, value per year)`
    pub series: Vec<(String, Vec<Option<f64>>)>,
}

/// Pull each country's row for `panel.indicator`. A missing country row
/// or year column is an error.
pub fn prepare_line_panel(
    table: &WideTable,
    panel: &LinePanel,
    countries: &[String],
    years: &[String],
) -> anyhow::Result<LineChart> {
    let x = years
        .iter()
        .map(|y| {
            y.parse::<f64>()
                .with_context(|| format!("year `{}` is not a number", y))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut series = Vec::with_capacity(countries.len());
    for country in countries {
        let row = table.find_row(country, &panel.indicator)?;
        let values = years
            .iter()
            .map(|y| -> anyhow::Result<Option<f64>> {
                Ok(table.cell(y, row)?.and_then(parse_numeric))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        series.push((country.clone(), values));
    }

    Ok(LineChart {
        indicator: panel.indicator.clone(),
        years: x,
        series,
    })
}

/// Points of one line; a missing value breaks the line there.
fn segments(years: &[f64], values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (x, v) in years.iter().zip(values) {
        match v {
            Some(v) => current.push((*x, *v)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

pub fn render_lines(chart_data: &LineChart, panel: &LinePanel, output_path: &Path) -> Result<()> {
    if chart_data.years.is_empty() || chart_data.series.is_empty() {
        return Err(PlotError::InvalidData(format!(
            "nothing to plot for `{}`",
            chart_data.indicator
        )));
    }

    let root = BitMapBackend::new(output_path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let (x_lo, x_hi) = padded_range(chart_data.years.iter().copied(), false);
    let (y_lo, y_hi) = padded_range(
        chart_data
            .series
            .iter()
            .flat_map(|(_, v)| v.iter().flatten().copied()),
        false,
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(&panel.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(100)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let y_fmt = |y: &f64| match panel.y_decimals {
        Some(d) => format!("{:.*}", d, y),
        None => format!("{}", y),
    };
    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(&panel.y_label)
        .x_labels(chart_data.years.len())
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&y_fmt)
        .label_style(("sans-serif", 14))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (idx, (country, values)) in chart_data.series.iter().enumerate() {
        let color = color_at(&panel.colors, idx)?;
        let parts = segments(&chart_data.years, values);
        let points: Vec<(f64, f64)> = parts.iter().flatten().copied().collect();

        for (n, part) in parts.iter().enumerate() {
            let anno = chart
                .draw_series(LineSeries::new(part.iter().copied(), color.stroke_width(2)))
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
            if n == 0 {
                anno.label(country.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
        }

        match panel.marker {
            Marker::Diamond => chart.draw_series(points.iter().map(|&p| {
                EmptyElement::at(p)
                    + Polygon::new(vec![(0, -6), (6, 0), (0, 6), (-6, 0)], color.filled())
            })),
            Marker::Triangle => chart.draw_series(
                points
                    .iter()
                    .map(|&p| TriangleMarker::new(p, 7, color.filled())),
            ),
            Marker::Circle => {
                chart.draw_series(points.iter().map(|&p| Circle::new(p, 5, color.filled())))
            }
        }
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    let position = match panel.legend {
        LegendCorner::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendCorner::UpperRight => SeriesLabelPosition::UpperRight,
        LegendCorner::LowerLeft => SeriesLabelPosition::LowerLeft,
        LegendCorner::LowerRight => SeriesLabelPosition::LowerRight,
    };
    chart
        .configure_series_labels()
        .position(position)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}
