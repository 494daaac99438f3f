//! Raster rendering of [`ChartSpec`]s.
//!
//! Charts are drawn with plotters into an in-memory RGB buffer and then encoded by hand so the
//! PNG carries a `pHYs` chunk with the requested resolution. Nothing here needs a display; the
//! optional viewer launch in [`show`] runs only after a file has been written.

use crate::chart::{ChartSpec, Rgb};
use crate::error::{PlotError, Result};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

const FONT: &str = "sans-serif";
/// Name prefix of the temporary files [`write_pngs`] stages next to each output.
pub const STAGING_PREFIX: &str = ".trajplot-";
const INCHES_PER_METRE: f64 = 1.0 / 0.0254;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Write files only.
    #[default]
    Headless,
    /// Also open every written file in an image viewer.
    Interactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub dpi: u32,
    pub width_in: f64,
    pub height_in: f64,
    /// Line width in points.
    pub line_width: f64,
    pub show_grid: bool,
    pub display: DisplayMode,
    /// Viewer command for interactive mode, e.g. `"feh -Z"`. Platform opener when unset.
    pub viewer: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            dpi: 300,
            width_in: 6.4,
            height_in: 4.8,
            line_width: 1.5,
            show_grid: true,
            display: DisplayMode::Headless,
            viewer: None,
        }
    }
}

impl RenderSettings {
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (self.width_in * dpi).round() as u32,
            (self.height_in * dpi).round() as u32,
        )
    }

    fn points_to_pixels(&self, points: f64) -> f64 {
        points * f64::from(self.dpi) / 72.0
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.dpi == 0 {
            return Err("dpi must be positive".to_string());
        }
        if !(self.width_in.is_finite() && self.height_in.is_finite())
            || self.width_in <= 0.0
            || self.height_in <= 0.0
        {
            return Err("figure size must be finite and positive".to_string());
        }
        let (w, h) = self.pixel_size();
        if w == 0 || h == 0 {
            return Err(format!("figure rounds to an empty {w}x{h} image"));
        }
        if !self.line_width.is_finite() || self.line_width < 0.0 {
            return Err("line_width must be finite and non-negative".to_string());
        }
        Ok(())
    }
}

/// Renders `spec` to PNG bytes.
pub fn render_png(spec: &ChartSpec, settings: &RenderSettings) -> Result<Vec<u8>> {
    let render_err = |reason: String| PlotError::Render {
        title: spec.title.clone(),
        reason,
    };

    settings.validate().map_err(render_err)?;
    if spec.series.is_empty() {
        return Err(render_err("no series to draw".to_string()));
    }
    let bounds = spec
        .bounds()
        .ok_or_else(|| render_err("no finite data points".to_string()))?;

    let (width, height) = settings.pixel_size();
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, spec, settings, bounds).map_err(|err| render_err(err.to_string()))?;
    }
    debug!(
        title = %spec.title,
        series = spec.series.len(),
        width,
        height,
        "rendered chart"
    );

    encode_png(&buffer, width, height, settings.dpi)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    settings: &RenderSettings,
    ((x0, x1), (y0, y1)): ((f64, f64), (f64, f64)),
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let px = |points: f64| settings.points_to_pixels(points);

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(spec.title.as_str(), (FONT, px(12.0)))
        .margin(px(8.0).round() as u32)
        .x_label_area_size(px(30.0).round() as u32)
        .y_label_area_size(px(44.0).round() as u32)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .axis_desc_style((FONT, px(10.0)))
        .label_style((FONT, px(9.0)))
        .x_labels(8)
        .y_labels(8);
    if settings.show_grid {
        mesh.bold_line_style(&BLACK.mix(0.15))
            .light_line_style(&TRANSPARENT);
    } else {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    let legend_len = px(20.0).round() as i32;

    for (index, series) in spec.series.iter().enumerate() {
        let Rgb(r, g, b) = spec.color_of(index);
        let width = series.line_width.unwrap_or(settings.line_width);
        let stroke = px(width).round().max(1.0) as u32;
        let style = RGBColor(r, g, b).stroke_width(stroke);

        chart
            .draw_series(LineSeries::new(spec.visible_points(series), style))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], style));
    }

    chart
        .configure_series_labels()
        .label_font((FONT, px(9.0)))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK.mix(0.3))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}

fn encode_png(rgb: &[u8], width: u32, height: u32, dpi: u32) -> Result<Vec<u8>> {
    let ppm = (f64::from(dpi) * INCHES_PER_METRE).round() as u32;
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgb)?;
        writer.finish()?;
    }
    Ok(bytes)
}

/// Writes every encoded image or none of them, creating missing parent directories.
///
/// Each image is first staged in a temporary file next to its destination. Renames start only
/// once every image is on disk; if one fails, the files already renamed are removed again and
/// the remaining temporaries are dropped.
pub fn write_pngs(outputs: &[(PathBuf, Vec<u8>)]) -> Result<Vec<PathBuf>> {
    let mut staged = Vec::with_capacity(outputs.len());
    for (path, bytes) in outputs {
        staged.push((path, stage_png(path, bytes)?));
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (path, file) in staged {
        if let Err(err) = file.persist(path) {
            for done in &written {
                if let Err(cleanup) = fs::remove_file(done) {
                    warn!(path = %done.display(), error = %cleanup, "could not roll back chart");
                }
            }
            return Err(PlotError::io(path, err.error));
        }
        info!(path = %path.display(), "wrote chart");
        written.push(path.clone());
    }
    Ok(written)
}

fn stage_png(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| PlotError::io(dir, err))?;

    let mut file = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(".png")
        .tempfile_in(dir)
        .map_err(|err| PlotError::io(dir, err))?;
    file.write_all(bytes)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|err| PlotError::io(file.path(), err))?;
    debug!(path = %path.display(), bytes = bytes.len(), "staged chart");
    Ok(file)
}

/// Opens a written chart in a viewer when interactive display is enabled.
/// Viewer failures are logged and otherwise ignored.
pub fn show(path: &Path, settings: &RenderSettings) {
    if settings.display != DisplayMode::Interactive {
        return;
    }
    let mut command = viewer_command(settings.viewer.as_deref());
    command.arg(path);
    match command.status() {
        Ok(status) if status.success() => debug!(path = %path.display(), "opened viewer"),
        Ok(status) => warn!(path = %path.display(), %status, "viewer exited unsuccessfully"),
        Err(err) => warn!(path = %path.display(), error = %err, "could not launch viewer"),
    }
}

fn viewer_command(viewer: Option<&str>) -> Command {
    if let Some(viewer) = viewer {
        let mut parts = viewer.split_whitespace();
        if let Some(program) = parts.next() {
            let mut command = Command::new(program);
            command.args(parts);
            return command;
        }
    }
    if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    }
}
