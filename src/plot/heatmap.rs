use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

use super::{PlotError, Result};
use crate::stats::CorrelationMatrix;

/// BuPu ramp, light to dark.
const BUPU: [(u8, u8, u8); 9] = [
    (247, 252, 253),
    (224, 236, 244),
    (191, 211, 230),
    (158, 188, 218),
    (140, 150, 198),
    (140, 107, 177),
    (136, 65, 157),
    (129, 15, 124),
    (77, 0, 75),
];

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapCell {
    pub row: usize,
    pub col: usize,
    pub value: Option<f64>,
    /// Position on the colour ramp, 0..=1; `None` for an undefined cell.
    pub shade: Option<f64>,
    pub annotation: String,
}

/// Cells in row-major order, shaded between the matrix's own min and max.
pub fn heatmap_cells(matrix: &CorrelationMatrix) -> Vec<HeatmapCell> {
    let defined = matrix.values.iter().flatten().flatten().copied();
    let (lo, hi) = defined.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let mut cells = Vec::with_capacity(matrix.labels.len().pow(2));
    for (row, values) in matrix.values.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            let shade = value.map(|v| if hi > lo { (v - lo) / (hi - lo) } else { 0.5 });
            cells.push(HeatmapCell {
                row,
                col,
                value: *value,
                shade,
                annotation: value.map_or_else(|| "nan".to_string(), |v| format!("{:.2}", v)),
            });
        }
    }
    cells
}

pub fn bupu(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0) * (BUPU.len() - 1) as f64;
    let i = (t.floor() as usize).min(BUPU.len() - 2);
    let f = t - i as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    let (a, b) = (BUPU[i], BUPU[i + 1]);
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Label of one segment; the y axis counts from the bottom, so it reads the
/// labels in reverse to keep the first one on top.
fn segment_label(labels: &[String], v: &SegmentValue<i32>, from_bottom: bool) -> String {
    let idx = match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i,
        SegmentValue::Last => return String::new(),
    };
    let idx = if from_bottom {
        labels.len() as i32 - 1 - idx
    } else {
        idx
    };
    usize::try_from(idx)
        .ok()
        .and_then(|i| labels.get(i).cloned())
        .unwrap_or_default()
}

/// Annotated correlation heatmap, first label on the top row.
pub fn render_heatmap(matrix: &CorrelationMatrix, output_path: &Path) -> Result<()> {
    let n = matrix.labels.len();
    if n == 0 {
        return Err(PlotError::InvalidData(
            "correlation matrix is empty".to_string(),
        ));
    }
    let labels = &matrix.labels;
    let last = n as i32 - 1;

    let root = BitMapBackend::new(output_path, (1200, 1000)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    // labels live on the segmented axes, cells on a 0..n grid laid over them
    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Heatmap between Indicators", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(260)
        .y_label_area_size(300)
        .build_cartesian_2d((0..last).into_segmented(), (0..last).into_segmented())
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?
        .set_secondary_coord(0.0..n as f64, 0.0..n as f64);

    let x_fmt = |v: &SegmentValue<i32>| segment_label(labels, v, false);
    let y_fmt = |v: &SegmentValue<i32>| segment_label(labels, v, true);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Series")
        .y_desc("Series")
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .label_style(("sans-serif", 14))
        .x_label_style(("sans-serif", 13).into_font().transform(FontTransform::Rotate90))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let cells = heatmap_cells(matrix);
    chart
        .draw_secondary_series(cells.iter().map(|c| {
            let top = (n - c.row) as f64;
            let fill = c.shade.map_or(WHITE, bupu);
            Rectangle::new(
                [(c.col as f64, top - 1.0), (c.col as f64 + 1.0, top)],
                fill.filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_secondary_series(cells.iter().map(|c| {
            let dark = c.shade.is_some_and(|s| s > 0.6);
            let style = ("sans-serif", 16)
                .into_font()
                .color(if dark { &WHITE } else { &BLACK })
                .pos(Pos::new(HPos::Center, VPos::Center));
            Text::new(
                c.annotation.clone(),
                (c.col as f64 + 0.5, (n - c.row) as f64 - 0.5),
                style,
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> CorrelationMatrix {
        CorrelationMatrix {
            labels: vec!["A".into(), "B".into()],
            values: vec![vec![Some(1.0), Some(-0.5)], vec![Some(-0.5), None]],
        }
    }

    #[test]
    fn cells_are_row_major_and_annotated() {
        let cells = heatmap_cells(&matrix());
        assert_eq!(cells.len(), 4);
        assert_eq!((cells[1].row, cells[1].col), (0, 1));
        assert_eq!(cells[0].annotation, "1.00");
        assert_eq!(cells[1].annotation, "-0.50");
        assert_eq!(cells[3].annotation, "nan");
        assert_eq!(cells[0].shade, Some(1.0));
        assert_eq!(cells[1].shade, Some(0.0));
        assert_eq!(cells[3].shade, None);
    }

    #[test]
    fn ramp_endpoints() {
        assert_eq!(bupu(0.0), RGBColor(247, 252, 253));
        assert_eq!(bupu(1.0), RGBColor(77, 0, 75));
        assert_eq!(bupu(2.0), RGBColor(77, 0, 75));
    }

    #[test]
    fn renders_png() -> anyhow::Result<()> {
        if !crate::plot::fonts_available() {
            return Ok(());
        }
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("heatmap.png");
        let mut m = matrix();
        m.labels = vec![
            "2001 Urban population (% of total population)".into(),
            "2001 Cereal yield (kg per hectare)".into(),
        ];
        render_heatmap(&m, &out)?;
        assert!(std::fs::metadata(&out)?.len() > 0);
        Ok(())
    }

    #[test]
    fn y_labels_read_top_down() {
        let labels = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(0), true), "C");
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(0), false), "A");
        assert_eq!(segment_label(&labels, &SegmentValue::Exact(5), false), "");
        assert_eq!(segment_label(&labels, &SegmentValue::Last, true), "");
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let empty = CorrelationMatrix {
            labels: Vec::new(),
            values: Vec::new(),
        };
        let out = std::env::temp_dir().join("never_written.png");
        assert!(matches!(
            render_heatmap(&empty, &out),
            Err(PlotError::InvalidData(_))
        ));
    }
}
