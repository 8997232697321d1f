use crate::grid::Domain;
use crate::simulation::PinMarker;
use ndarray::Array2;
use plotters::prelude::*;
use plotters::style::HSLColor;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMap {
    /// Red for positive, blue for negative, brightness on a log scale.
    LogHsl,
    /// Red-yellow-blue gradient over `[-A_max, A_max]`.
    Diverging,
}

pub struct FieldRenderer {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    color_map: ColorMap,
    amplitude_max: f64,
    gradient: Box<dyn colorgrad::Gradient>,
}

impl FieldRenderer {
    pub fn new(
        output_dir: &str,
        width: u32,
        height: u32,
        color_map: ColorMap,
        amplitude_max: f64,
    ) -> std::io::Result<Self> {
        std::fs::create_dir_all(output_dir)?;

        let gradient = Box::new(colorgrad::preset::rd_yl_bu());

        Ok(Self {
            output_dir: PathBuf::from(output_dir),
            width,
            height,
            color_map,
            amplitude_max,
            gradient,
        })
    }

    pub fn plot_field(
        &self,
        data: &Array2<f64>,
        domain: &Domain,
        pin: Option<PinMarker>,
        tick: u64,
        status: &str,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = self.output_dir.join(format!("membrane_{:06}.png", tick));
        // The backend borrows `path` until it is dropped
        {
            let root = BitMapBackend::new(&path, (self.width, self.height)).into_drawing_area();
            root.fill(&BLACK)?;

            let (nx, ny) = data.dim();
            let title = format!("tick {}: {}", tick, status);
            let mut chart = ChartBuilder::on(&root)
                .caption(&title, ("sans-serif", 18).into_font().color(&WHITE))
                .margin(10)
                .build_cartesian_2d(0.0..nx as f64, 0.0..ny as f64)?;

            let cells = data
                .indexed_iter()
                .filter(|&((i, j), _)| domain.is_interior(i, j))
                .map(|((i, j), &value)| {
                    let (x, y) = (i as f64, j as f64);
                    Rectangle::new([(x, y), (x + 1.0, y + 1.0)], self.value_to_color(value).filled())
                });
            chart.draw_series(cells)?;

            // Cell (i, j) spans [i, i + 1), so the disc center sits half a cell over
            let (cx, cy) = domain.center();
            chart.draw_series(LineSeries::new(
                ring(cx + 0.5, cy + 0.5, domain.radius()),
                GREEN.stroke_width(2),
            ))?;

            if let Some(marker) = pin {
                chart.draw_series(LineSeries::new(
                    ring(marker.x as f64 + 0.5, marker.y as f64 + 0.5, marker.radius + 0.5),
                    WHITE.stroke_width(1),
                ))?;
            }

            root.present()?;
        }
        Ok(path)
    }

    pub fn value_to_color(&self, value: f64) -> RGBColor {
        match self.color_map {
            ColorMap::LogHsl => log_hsl(value, self.amplitude_max),
            ColorMap::Diverging => {
                let a = self.amplitude_max;
                let normalized = if a > 0.0 { (value + a) / (2.0 * a) } else { 0.5 };
                let normalized = normalized.clamp(0.0, 1.0);
                let rgba = self.gradient.at(normalized as f32).to_rgba8();
                RGBColor(rgba[0], rgba[1], rgba[2])
            }
        }
    }
}

/// Saturation and lightness grow with `ln(|v| + 1)`; hue encodes the sign.
fn log_hsl(value: f64, amplitude_max: f64) -> RGBColor {
    let mut log_max = (amplitude_max + 1.0).ln();
    if log_max == 0.0 {
        log_max = 1.0;
    }
    let level = (value.abs() + 1.0).ln() / log_max;
    let saturation = level.clamp(0.0, 1.0);
    let lightness = (level * 0.95).clamp(0.0, 1.0);
    let hue = if value < 0.0 { 240.0 / 360.0 } else { 0.0 };
    let c = HSLColor(hue, saturation, lightness).to_rgba();
    RGBColor(c.0, c.1, c.2)
}

fn ring(cx: f64, cy: f64, r: f64) -> Vec<(f64, f64)> {
    (0..=128)
        .map(|k| {
            let theta = 2.0 * PI * k as f64 / 128.0;
            (cx + r * theta.cos(), cy + r * theta.sin())
        })
        .collect()
}
