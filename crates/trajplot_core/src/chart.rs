//! Backend-independent description of a single line chart.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Tableau 10 colours, in cycle order.
pub const TAB10: [Rgb; 10] = [
    Rgb(31, 119, 180),
    Rgb(255, 127, 14),
    Rgb(44, 160, 44),
    Rgb(214, 39, 40),
    Rgb(148, 103, 189),
    Rgb(140, 86, 75),
    Rgb(227, 119, 194),
    Rgb(127, 127, 127),
    Rgb(188, 189, 34),
    Rgb(23, 190, 207),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    /// Falls back to the palette slot matching the series index.
    pub color: Option<Rgb>,
    /// Line width in points. Falls back to the render settings.
    pub line_width: Option<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
            color: None,
            line_width: None,
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_line_width(mut self, points: f64) -> Self {
        self.line_width = Some(points);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    /// Restricts the visible x interval; y still autoscales over every point.
    pub x_window: Option<(f64, f64)>,
}

impl ChartSpec {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series: Vec::new(),
            x_window: None,
        }
    }

    pub fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn x_window(mut self, lo: f64, hi: f64) -> Self {
        self.x_window = Some((lo, hi));
        self
    }

    pub fn legend_labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }

    pub(crate) fn color_of(&self, index: usize) -> Rgb {
        self.series
            .get(index)
            .and_then(|s| s.color)
            .unwrap_or(TAB10[index % TAB10.len()])
    }

    /// The x window, if it is usable. Empty, inverted, or non-finite windows are ignored.
    pub fn window(&self) -> Option<(f64, f64)> {
        self.x_window
            .filter(|&(lo, hi)| lo.is_finite() && hi.is_finite() && hi > lo)
    }

    /// The polyline actually drawn for `series`: non-finite points dropped, and with a window,
    /// every segment clipped to it so lines run up to the window edges.
    pub fn visible_points(&self, series: &Series) -> Vec<(f64, f64)> {
        let finite = series
            .points
            .iter()
            .copied()
            .filter(|&(x, y)| x.is_finite() && y.is_finite());
        let Some((lo, hi)) = self.window() else {
            return finite.collect();
        };

        let finite: Vec<(f64, f64)> = finite.collect();
        let mut out: Vec<(f64, f64)> = Vec::new();
        let push = |p: (f64, f64), out: &mut Vec<(f64, f64)>| {
            if out.last() != Some(&p) {
                out.push(p);
            }
        };
        if let [only] = finite.as_slice() {
            if only.0 >= lo && only.0 <= hi {
                out.push(*only);
            }
            return out;
        }
        for pair in finite.windows(2) {
            if let Some((a, b)) = clip_segment(pair[0], pair[1], lo, hi) {
                push(a, &mut out);
                push(b, &mut out);
            }
        }
        out
    }

    /// Axis bounds with a 5% margin on each side, over finite points only.
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for &(x, y) in self.series.iter().flat_map(|s| s.points.iter()) {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if !x_min.is_finite() || !y_min.is_finite() {
            return None;
        }

        let x_range = self.window().unwrap_or_else(|| pad(x_min, x_max));
        Some((x_range, pad(y_min, y_max)))
    }
}

fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    lo: f64,
    hi: f64,
) -> Option<((f64, f64), (f64, f64))> {
    let (left, right) = if a.0 <= b.0 { (a, b) } else { (b, a) };
    if right.0 < lo || left.0 > hi {
        return None;
    }
    let at = |x: f64| {
        let dx = right.0 - left.0;
        if dx == 0.0 {
            return (x, left.1);
        }
        (x, left.1 + (right.1 - left.1) * (x - left.0) / dx)
    };
    let start = if left.0 < lo { at(lo) } else { left };
    let end = if right.0 > hi { at(hi) } else { right };
    // Keep the original drawing direction.
    if a.0 <= b.0 {
        Some((start, end))
    } else {
        Some((end, start))
    }
}

fn pad(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span > 0.0 {
        let margin = 0.05 * span;
        return (min - margin, max + margin);
    }
    let half = if min == 0.0 { 0.5 } else { 0.05 * min.abs() };
    (min - half, max + half)
}

#[cfg(test)]
mod tests {
    use super::{ChartSpec, Rgb, Series, TAB10};

    #[test]
    fn bounds_pad_by_five_percent() {
        let chart = ChartSpec::new("t", "x", "y")
            .series(Series::new("a", vec![(0.0, -1.0), (10.0, 1.0)]));
        let ((x0, x1), (y0, y1)) = chart.bounds().expect("bounds");
        assert!((x0 + 0.5).abs() < 1e-12 && (x1 - 10.5).abs() < 1e-12);
        assert!((y0 + 1.1).abs() < 1e-12 && (y1 - 1.1).abs() < 1e-12);
    }

    #[test]
    fn bounds_ignore_non_finite_points_and_widen_flat_lines() {
        let chart = ChartSpec::new("t", "x", "y").series(Series::new(
            "flat",
            vec![(0.0, 2.0), (f64::NAN, 3.0), (1.0, 2.0), (2.0, f64::INFINITY)],
        ));
        let (_, (y0, y1)) = chart.bounds().expect("bounds");
        assert!(y0 < 2.0 && y1 > 2.0, "flat range must be widened: {y0}..{y1}");
    }

    #[test]
    fn x_window_overrides_x_but_not_y() {
        let chart = ChartSpec::new("t", "x", "y")
            .series(Series::new("a", vec![(0.0, 0.0), (1.0, 5.0)]))
            .x_window(0.0, 0.002);
        let ((x0, x1), (_, y1)) = chart.bounds().expect("bounds");
        assert_eq!((x0, x1), (0.0, 0.002));
        assert!(y1 > 5.0);
    }

    #[test]
    fn window_clips_coarse_segments_to_its_edges() {
        // Samples every 5 ms, zoomed to the first 2 ms.
        let series = Series::new("explicit", vec![(0.0, 0.0), (0.005, 1.0), (0.01, 1.2)]);
        let chart = ChartSpec::new("t", "x", "y")
            .series(series.clone())
            .x_window(0.0, 0.002);
        let points = chart.visible_points(&series);
        assert_eq!(points.len(), 2, "got {points:?}");
        assert_eq!(points[0], (0.0, 0.0));
        assert!((points[1].0 - 0.002).abs() < 1e-15);
        assert!((points[1].1 - 0.4).abs() < 1e-12);
    }

    #[test]
    fn window_clips_both_ends_of_dense_data() {
        let series = Series::new(
            "s",
            (0..=10).map(|i| (i as f64, i as f64 * 2.0)).collect(),
        );
        let chart = ChartSpec::new("t", "x", "y")
            .series(series.clone())
            .x_window(2.5, 7.5);
        let points = chart.visible_points(&series);
        assert_eq!(points.first(), Some(&(2.5, 5.0)));
        assert_eq!(points.last(), Some(&(7.5, 15.0)));
        assert_eq!(points.len(), 7);
    }

    #[test]
    fn unusable_window_is_ignored_everywhere() {
        let series = Series::new("s", vec![(0.0, 1.0), (1.0, 2.0)]);
        for (lo, hi) in [(0.0, 0.0), (0.0, -0.001), (f64::NAN, 1.0)] {
            let chart = ChartSpec::new("t", "x", "y")
                .series(series.clone())
                .x_window(lo, hi);
            assert!(chart.window().is_none());
            assert_eq!(chart.visible_points(&series), series.points);
            let ((x0, x1), _) = chart.bounds().expect("bounds");
            assert!(x0 < 0.0 && x1 > 1.0);
        }
    }

    #[test]
    fn empty_chart_has_no_bounds() {
        assert!(ChartSpec::new("t", "x", "y").bounds().is_none());
        let chart = ChartSpec::new("t", "x", "y").series(Series::new("nan", vec![(f64::NAN, 1.0)]));
        assert!(chart.bounds().is_none());
    }

    #[test]
    fn colours_fall_back_to_palette() {
        let chart = ChartSpec::new("t", "x", "y")
            .series(Series::new("a", vec![]))
            .series(Series::new("b", vec![]).with_color(Rgb(1, 2, 3)));
        assert_eq!(chart.color_of(0), TAB10[0]);
        assert_eq!(chart.color_of(1), Rgb(1, 2, 3));
        assert_eq!(chart.legend_labels(), vec!["a", "b"]);
    }
}
