//! Chart sets for the IRK and RC result files, and their execution.
//!
//! Building a job list is pure. [`execute`] renders every job in memory and writes the files
//! all-or-nothing, so a failing chart or write leaves no partial output behind.

use crate::algorithm::Algorithm;
use crate::chart::{ChartSpec, Series};
use crate::error::Result;
use crate::rc::MethodDatasets;
use crate::render::{render_png, show, write_pngs, RenderSettings};
use crate::table::{LoadOptions, TimeSeriesTable};
use std::path::{Path, PathBuf};
use tracing::debug;

const TIME_COL: usize = 0;
const RC_ZOOM_SPAN: f64 = 0.002;
const RC_LINE_WIDTH: f64 = 1.0;

/// One output file.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotJob {
    pub file_name: String,
    pub chart: ChartSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrkRun {
    /// End time as a multiple of pi, spelled as the user gave it. Titles repeat it verbatim.
    pub tend_relative: String,
    pub steps: u64,
    pub algorithm: Algorithm,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RcRun {
    pub tend: f64,
    pub steps: u64,
}

/// `t x v` as printed by the single-method IRK driver.
pub fn irk_single_options() -> LoadOptions {
    LoadOptions::whitespace().columns([0, 1, 2])
}

/// Header row plus time and one (x, v) pair per algorithm.
pub fn irk_table_options() -> LoadOptions {
    LoadOptions::comma().skip_rows(1).columns(0..9)
}

pub fn irk_single_jobs(table: &TimeSeriesTable, run: &IrkRun) -> Result<Vec<PlotJob>> {
    let suffix = format!(
        "tend = {}pi, steps = {} , {}",
        run.tend_relative,
        run.steps,
        run.algorithm
    );
    mass_spring_jobs(table, (1, 2), run.algorithm, &suffix)
}

pub fn irk_table_jobs(table: &TimeSeriesTable, algorithm: Algorithm) -> Result<Vec<PlotJob>> {
    mass_spring_jobs(table, algorithm.columns(), algorithm, "")
}

fn mass_spring_jobs(
    table: &TimeSeriesTable,
    (x_col, v_col): (usize, usize),
    algorithm: Algorithm,
    suffix: &str,
) -> Result<Vec<PlotJob>> {
    let title = |base: &str| {
        if suffix.is_empty() {
            format!("{base} ({algorithm})")
        } else {
            format!("{base}, {suffix}")
        }
    };

    let evolution = ChartSpec::new(title("Mass-Spring System Time Evolution"), "time", "value")
        .series(Series::new("position", table.pairs(TIME_COL, x_col)?))
        .series(Series::new("velocity", table.pairs(TIME_COL, v_col)?));
    let phase = ChartSpec::new(title("Mass-Spring System Phase Plot"), "position", "velocity")
        .series(Series::new("phase plot", table.pairs(x_col, v_col)?));

    Ok(vec![
        PlotJob {
            file_name: format!("Time_evolution_{algorithm}.png"),
            chart: evolution,
        },
        PlotJob {
            file_name: format!("Phase_plot_{algorithm}.png"),
            chart: phase,
        },
    ])
}

pub fn rc_jobs(datasets: &MethodDatasets, run: &RcRun) -> Vec<PlotJob> {
    let tend = format_float(run.tend);
    let method_series = || {
        datasets.iter().map(|(method, points)| {
            Series::new(method.name(), points.to_vec())
                .with_color(method.color())
                .with_line_width(RC_LINE_WIDTH)
        })
    };

    let mut full = ChartSpec::new(
        format!("RC circuit, tend = {}, steps = {}", tend, run.steps),
        "time t [s]",
        "capacitor voltage U_C(t)",
    );
    full.series.extend(method_series());

    let mut zoom = ChartSpec::new("RC circuit (zoomed, first 2 ms)", "time t [s]", "U_C(t)")
        .x_window(0.0, run.tend.min(RC_ZOOM_SPAN));
    zoom.series.extend(method_series());

    vec![
        PlotJob {
            file_name: format!("RC_Time_evolution_tend_{}_steps_{}.png", tend, run.steps),
            chart: full,
        },
        PlotJob {
            file_name: format!("RC_Time_evolution_zoom_tend_{}_steps_{}.png", tend, run.steps),
            chart: zoom,
        },
    ]
}

/// Renders every job, then writes them under `out_dir` and hands each to the viewer.
pub fn execute(jobs: &[PlotJob], out_dir: &Path, settings: &RenderSettings) -> Result<Vec<PathBuf>> {
    let rendered = jobs
        .iter()
        .map(|job| -> Result<(PathBuf, Vec<u8>)> {
            Ok((out_dir.join(&job.file_name), render_png(&job.chart, settings)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let written = write_pngs(&rendered)?;
    debug!(count = written.len(), dir = %out_dir.display(), "charts written");

    for path in &written {
        show(path, settings);
    }
    Ok(written)
}

/// Formats a float the way the result files and titles have always spelled it: the shortest
/// round-trip digits, integral values with one decimal (`1.0`), and exponent notation with a
/// signed two-digit exponent outside `1e-4 <= |v| < 1e16` (`1e-05`, `1.5e+16`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .map(|(m, e)| (m, e.parse::<i32>().unwrap_or(0)))
        .unwrap_or((scientific.as_str(), 0));
    if value != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }

    let plain = format!("{value}");
    if plain.contains('.') {
        plain
    } else {
        format!("{plain}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::{
        execute, format_float, irk_single_jobs, irk_single_options, irk_table_jobs,
        irk_table_options, rc_jobs, IrkRun, PlotJob, RcRun,
    };
    use crate::algorithm::Algorithm;
    use crate::chart::{ChartSpec, Series};
    use crate::rc::{MethodDatasets, RcMethod};
    use crate::render::{RenderSettings, STAGING_PREFIX};
    use crate::table::parse_table;
    use tempfile::TempDir;

    fn small_settings() -> RenderSettings {
        RenderSettings {
            dpi: 50,
            width_in: 4.0,
            height_in: 3.0,
            ..RenderSettings::default()
        }
    }

    fn combined_table() -> crate::table::TimeSeriesTable {
        let text = "t,g2x,g2v,g3x,g3v,r2x,r2v,r3x,r3v\n\
                    0,1,0,2,0,3,0,4,0\n\
                    0.5,0.9,-0.5,1.9,-0.4,2.9,-0.3,3.9,-0.2\n";
        parse_table(text, "data.txt", &irk_table_options()).expect("combined table")
    }

    #[test]
    fn format_float_matches_result_file_spelling() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(4.0), "4.0");
        assert_eq!(format_float(0.01), "0.01");
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(1e15), "1000000000000000.0");
        assert_eq!(format_float(-0.0), "-0.0");
    }

    #[test]
    fn format_float_switches_to_signed_exponents() {
        assert_eq!(format_float(1e-5), "1e-05");
        assert_eq!(format_float(2.5e-7), "2.5e-07");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e16), "1.5e+16");
        assert_eq!(format_float(1e22), "1e+22");
        assert_eq!(format_float(-3e-120), "-3e-120");
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn irk_single_jobs_use_first_three_columns() {
        let table = parse_table("0 1 0\n0.1 0.99 -0.1\n", "gauss2.txt", &irk_single_options())
            .expect("table");
        let run = IrkRun {
            tend_relative: "4".to_string(),
            steps: 100,
            algorithm: Algorithm::Radau3,
        };
        let jobs = irk_single_jobs(&table, &run).expect("jobs");
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].file_name, "Time_evolution_Radau3.png");
        assert_eq!(
            jobs[0].chart.title,
            "Mass-Spring System Time Evolution, tend = 4pi, steps = 100 , Radau3"
        );
        assert_eq!(jobs[0].chart.legend_labels(), vec!["position", "velocity"]);
        assert_eq!(jobs[0].chart.series[1].points[1], (0.1, -0.1));
        assert_eq!(jobs[1].file_name, "Phase_plot_Radau3.png");
        assert_eq!(jobs[1].chart.series[0].points[1], (0.99, -0.1));
        assert_eq!(jobs[1].chart.x_label, "position");
    }

    #[test]
    fn irk_table_jobs_follow_resolved_columns() {
        let table = combined_table();
        let jobs = irk_table_jobs(&table, Algorithm::Gauss3).expect("jobs");
        assert_eq!(
            jobs[0].chart.title,
            "Mass-Spring System Time Evolution (Gauss3)"
        );
        assert_eq!(jobs[0].chart.series[0].points[1], (0.5, 1.9));
        assert_eq!(jobs[0].chart.series[1].points[1], (0.5, -0.4));
        // The phase plot uses the same pair, not the Gauss2 columns.
        assert_eq!(jobs[1].chart.series[0].points[1], (1.9, -0.4));
        assert_eq!(jobs[1].file_name, "Phase_plot_Gauss3.png");
    }

    #[test]
    fn rc_jobs_plot_only_available_methods() {
        let mut datasets = MethodDatasets::default();
        datasets.insert(RcMethod::CrankNicolson, vec![(0.0, 0.0), (0.001, 0.6)]);
        datasets.insert(RcMethod::Explicit, vec![(0.0, 0.0), (0.001, 0.7)]);
        let jobs = rc_jobs(&datasets, &RcRun { tend: 0.01, steps: 2000 });

        assert_eq!(jobs[0].file_name, "RC_Time_evolution_tend_0.01_steps_2000.png");
        assert_eq!(jobs[0].chart.title, "RC circuit, tend = 0.01, steps = 2000");
        assert_eq!(
            jobs[1].file_name,
            "RC_Time_evolution_zoom_tend_0.01_steps_2000.png"
        );
        for job in &jobs {
            assert_eq!(job.chart.legend_labels(), vec!["explicit", "CN"]);
        }
        assert_eq!(jobs[0].chart.series[1].color, Some(RcMethod::CrankNicolson.color()));
        assert_eq!(jobs[1].chart.x_window, Some((0.0, 0.002)));
        for series in jobs.iter().flat_map(|job| job.chart.series.iter()) {
            assert_eq!(series.line_width, Some(1.0));
        }
    }

    #[test]
    fn rc_zoom_draws_coarse_runs_up_to_the_window_edge() {
        // dt = 0.005 leaves no sample inside (0, 0.002] apart from t = 0.
        let mut datasets = MethodDatasets::default();
        datasets.insert(
            RcMethod::Explicit,
            vec![(0.0, 0.0), (0.005, 0.9), (0.01, 0.99)],
        );
        let jobs = rc_jobs(&datasets, &RcRun { tend: 0.01, steps: 2 });
        let zoom = &jobs[1].chart;
        let points = zoom.visible_points(&zoom.series[0]);
        assert_eq!(points.len(), 2, "got {points:?}");
        assert!((points[1].0 - 0.002).abs() < 1e-15);
        assert!((points[1].1 - 0.36).abs() < 1e-12);

        let dir = TempDir::new().expect("tempdir");
        execute(&jobs, dir.path(), &small_settings()).expect("coarse RC run should render");
    }

    #[test]
    fn rc_zoom_window_is_clamped_to_end_time() {
        let mut datasets = MethodDatasets::default();
        datasets.insert(RcMethod::Implicit, vec![(0.0, 0.0), (0.001, 0.5)]);
        let jobs = rc_jobs(&datasets, &RcRun { tend: 0.001, steps: 10 });
        assert_eq!(jobs[1].chart.x_window, Some((0.0, 0.001)));
    }

    #[test]
    fn execute_writes_every_job() {
        let dir = TempDir::new().expect("tempdir");
        let out_dir = dir.path().join("plots").join("RC");
        let jobs = irk_table_jobs(&combined_table(), Algorithm::Gauss2).expect("jobs");
        let written = execute(&jobs, &out_dir, &small_settings()).expect("execute");
        assert_eq!(written.len(), 2);
        for path in written {
            assert!(path.starts_with(&out_dir));
            assert!(std::fs::metadata(&path).expect("written").len() > 0);
        }
    }

    #[test]
    fn execute_writes_nothing_when_a_chart_fails() {
        let dir = TempDir::new().expect("tempdir");
        let out_dir = dir.path().join("out");
        let jobs = vec![
            PlotJob {
                file_name: "good.png".to_string(),
                chart: ChartSpec::new("good", "x", "y")
                    .series(Series::new("s", vec![(0.0, 0.0), (1.0, 1.0)])),
            },
            PlotJob {
                file_name: "bad.png".to_string(),
                chart: ChartSpec::new("bad", "x", "y"),
            },
        ];
        execute(&jobs, &out_dir, &small_settings()).expect_err("empty chart should fail");
        assert!(!out_dir.exists(), "no output directory should be created");
    }

    #[test]
    fn execute_rolls_back_when_a_later_write_fails() {
        let dir = TempDir::new().expect("tempdir");
        let mut datasets = MethodDatasets::default();
        datasets.insert(RcMethod::Implicit, vec![(0.0, 0.0), (0.001, 0.6)]);
        let jobs = rc_jobs(&datasets, &RcRun { tend: 0.01, steps: 2000 });
        // A directory squatting on the zoom file name makes the second rename fail.
        std::fs::create_dir_all(dir.path().join(&jobs[1].file_name)).expect("blocker");

        execute(&jobs, dir.path(), &small_settings()).expect_err("blocked write should fail");

        assert!(!dir.path().join(&jobs[0].file_name).exists());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read out dir")
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(STAGING_PREFIX))
            .collect();
        assert!(leftovers.is_empty(), "staged files left behind: {leftovers:?}");
    }
}
