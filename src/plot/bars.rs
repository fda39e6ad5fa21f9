use anyhow::anyhow;
use arrow::array::Array;
use plotters::prelude::*;
use std::{cmp::Ordering, path::Path};

use super::{color_at, padded_range, PlotError, Result};
use crate::config::BarPanel;
use crate::load::{WideTable, COUNTRY, SERIES};

/// One indicator's bars: a group per country, a bar per year.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub indicator: String,
    pub countries: Vec<String>,
    pub years: Vec<String>,
    /// `values[country][year]`
    pub values: Vec<Vec<Option<f64>>>,
}

/// Rows of `panel.indicator`, countries ascending by `sort_year`
/// (missing values last, ties keep table order).
pub fn prepare_bar_panel(
    table: &WideTable,
    panel: &BarPanel,
    years: &[String],
    sort_year: &str,
) -> anyhow::Result<BarGroup> {
    let series = table.strings(SERIES)?;
    let countries = table.strings(COUNTRY)?;
    let mut rows: Vec<usize> = (0..table.num_rows())
        .filter(|&i| series.is_valid(i) && series.value(i) == panel.indicator)
        .collect();
    if rows.is_empty() {
        return Err(anyhow!("indicator `{}` not found", panel.indicator));
    }

    let key = table.numeric(sort_year)?;
    let at = |i: usize| key.is_valid(i).then(|| key.value(i));
    rows.sort_by(|&a, &b| match (at(a), at(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let columns = years
        .iter()
        .map(|y| table.numeric(y))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let values = rows
        .iter()
        .map(|&i| {
            columns
                .iter()
                .map(|c| c.is_valid(i).then(|| c.value(i)))
                .collect()
        })
        .collect();

    Ok(BarGroup {
        indicator: panel.indicator.clone(),
        countries: rows
            .iter()
            .map(|&i| {
                if countries.is_valid(i) {
                    countries.value(i).to_string()
                } else {
                    String::new()
                }
            })
            .collect(),
        years: years.to_vec(),
        values,
    })
}

/// All panels stacked vertically in one figure. Missing values leave a gap.
pub fn render_bars(
    panels: &[(BarGroup, &BarPanel)],
    bar_width: f64,
    output_path: &Path,
) -> Result<()> {
    if panels.is_empty() {
        return Err(PlotError::InvalidData("no bar panels".to_string()));
    }
    if bar_width <= 0.0 {
        return Err(PlotError::InvalidData(format!(
            "bar width must be positive, got {}",
            bar_width
        )));
    }

    let height = 600 * panels.len() as u32;
    let root = BitMapBackend::new(output_path, (1000, height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    for (area, (group, panel)) in root.split_evenly((panels.len(), 1)).iter().zip(panels) {
        draw_panel(area, group, panel, bar_width)?;
    }

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    group: &BarGroup,
    panel: &BarPanel,
    bar_width: f64,
) -> Result<()> {
    let n = group.countries.len();
    let k = group.years.len();
    if n == 0 {
        return Err(PlotError::InvalidData(format!(
            "no countries for `{}`",
            group.indicator
        )));
    }
    // bars of one country are centred on its tick
    let offset = |year_idx: usize| (year_idx as f64 - (k as f64 - 1.0) / 2.0) * bar_width;

    let (y_lo, y_hi) = padded_range(group.values.iter().flatten().flatten().copied(), true);

    // countries label a segmented axis; bars are placed on a matching f64 axis
    // where country `i` sits at `i`
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 26))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d((0..n as i32 - 1).into_segmented(), y_lo..y_hi)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?
        .set_secondary_coord(-0.5..n as f64 - 0.5, y_lo..y_hi);

    let x_fmt = |v: &SegmentValue<i32>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| group.countries.get(i).cloned())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Country")
        .y_desc(&panel.y_label)
        .x_labels(n)
        .x_label_formatter(&x_fmt)
        .label_style(("sans-serif", 14))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (y_idx, year) in group.years.iter().enumerate() {
        let color = color_at(&panel.colors, y_idx)?;
        let dx = offset(y_idx);
        let bars: Vec<(f64, f64)> = group
            .values
            .iter()
            .enumerate()
            .filter_map(|(c_idx, row)| row[y_idx].map(|v| (c_idx as f64 + dx, v)))
            .collect();

        chart
            .draw_secondary_series(bars.iter().map(|&(x, v)| {
                Rectangle::new(
                    [(x - bar_width / 2.0, 0.0), (x + bar_width / 2.0, v)],
                    color.filled(),
                )
            }))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(year.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));

        // black edge
        chart
            .draw_secondary_series(bars.iter().map(|&(x, v)| {
                Rectangle::new(
                    [(x - bar_width / 2.0, 0.0), (x + bar_width / 2.0, v)],
                    BLACK.stroke_width(1),
                )
            }))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}
