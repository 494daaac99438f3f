//! The `trajplot_core` crate turns the text output of ODE integrators (implicit Runge-Kutta
//! mass-spring runs, RC-circuit runs) into PNG charts.
//!
//! Key components:
//! - **Table**: delimited numeric tables loaded into a `DMatrix` (`load_table`, `parse_table`).
//! - **Algorithm**: the closed set of IRK schemes and their column pairs in the combined table.
//! - **RC**: per-method result files gathered into a `MethodDatasets` map.
//! - **Chart / Render**: a backend-free `ChartSpec` and its PNG rendering with DPI metadata.
//! - **Pipeline**: time-evolution and phase-plane chart sets, executed all-or-nothing.
pub mod algorithm;
pub mod chart;
pub mod error;
pub mod pipeline;
pub mod rc;
pub mod render;
pub mod table;

pub use algorithm::{resolve_algorithm, Algorithm};
pub use chart::{ChartSpec, Rgb, Series};
pub use error::{PlotError, Result};
pub use pipeline::{execute, IrkRun, PlotJob, RcRun};
pub use rc::{load_method_datasets, MethodDatasets, RcMethod};
pub use render::{render_png, write_pngs, DisplayMode, RenderSettings};
pub use table::{load_table, parse_table, Delimiter, LoadOptions, TimeSeriesTable};
