use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use plotters::prelude::*;

use crate::{
    error::ChartError, models::history::HistoryDocument, services::pixel_font::PixelFontBackend,
};

const CHART_SIZE: (u32, u32) = (1200, 600);

type Series<'a> = (&'a str, Vec<(f64, f64)>);

pub fn chart_file_name(index: usize) -> String {
    format!("leaderboard_{index}.png")
}

pub struct ChartService {
    static_dir: PathBuf,
}

impl ChartService {
    pub fn new(static_dir: impl Into<PathBuf>) -> Self {
        Self {
            static_dir: static_dir.into(),
        }
    }

    /// Renders the track's history and replaces its chart file.
    pub async fn render(
        &self,
        index: usize,
        title: String,
        history: HistoryDocument,
    ) -> Result<PathBuf, ChartError> {
        let path = self.static_dir.join(chart_file_name(index));
        // the encoder picks the format from the extension, so the temp file keeps `.png`
        let tmp = self.static_dir.join(format!("leaderboard_{index}.tmp.png"));
        let io_err = |source| ChartError::Io {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.static_dir).await.map_err(io_err)?;
        let target = tmp.clone();
        tokio::task::spawn_blocking(move || render_png(&target, &title, &history)).await??;
        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;
        Ok(path)
    }
}

/// One line per user, x = sample time, y = seconds, name at the line's end.
pub fn render_png(path: &Path, title: &str, history: &HistoryDocument) -> Result<(), ChartError> {
    let series: Vec<Series> = history
        .values()
        .filter(|record| !record.data.is_empty())
        .map(|record| {
            let points = record
                .data
                .iter()
                .map(|s| (s.recorded_at().timestamp_millis() as f64 / 1000.0, s.seconds()))
                .collect();
            (record.name.as_str(), points)
        })
        .collect();
    let (x_range, y_range) = bounds(&series);

    let root = PixelFontBackend::new(BitMapBackend::new(path, CHART_SIZE)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Run Time (s)")
        .x_label_formatter(&|x| format_epoch(*x))
        .y_label_formatter(&|y| format!("{:.3}", y))
        .draw()
        .map_err(draw_err)?;

    for (i, (name, points)) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &color))
            .map_err(draw_err)?;
        if let Some(&last) = points.last() {
            chart
                .draw_series(std::iter::once(Text::new(
                    name.to_string(),
                    last,
                    ("sans-serif", 12).into_font().color(&color),
                )))
                .map_err(draw_err)?;
        }
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

fn bounds(series: &[Series]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let points = series.iter().flat_map(|(_, p)| p.iter());
    let (mut x_min, mut x_max, mut y_min, mut y_max) =
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !x_min.is_finite() {
        return (0.0..1.0, 0.0..1.0);
    }

    // single timestamp or a flat line would give an empty axis
    if x_max - x_min < 1.0 {
        x_min -= 60.0;
        x_max += 60.0;
    }
    let pad = ((y_max - y_min) * 0.05).max(0.5);
    (x_min..x_max, (y_min - pad)..(y_max + pad))
}

fn format_epoch(secs: f64) -> String {
    DateTime::<Utc>::from_timestamp(secs as i64, 0)
        .map(|t| t.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn draw_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}
