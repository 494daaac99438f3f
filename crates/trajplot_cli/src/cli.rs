//! Command-line surface.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;
use trajplot_core::DisplayMode;

#[derive(Parser, Debug)]
#[command(name = "trajplot", author, version, about = "Charts for ODE integrator output tables", long_about = None)]
pub struct Cli {
    /// Verbose logging
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Time evolution and phase plot of a single-method IRK run (`t x v` per line)
    Irk(IrkArgs),
    /// Time evolution and phase plot of one algorithm from the combined IRK table
    IrkTable(IrkTableArgs),
    /// Capacitor voltage of every available RC method, full range and zoomed
    Rc(RcArgs),
}

#[derive(Args, Debug)]
pub struct IrkArgs {
    /// End time as a multiple of pi (title only, shown as typed)
    #[arg(long, alias = "tend_relative", value_parser = numeric_text)]
    pub tend_relative: String,

    /// Number of integration steps (title only)
    #[arg(long)]
    pub steps: u64,

    /// Gauss2, Gauss3, Radau2 or Radau3
    #[arg(long)]
    pub algorithm: String,

    /// Whitespace-separated result file
    #[arg(long, default_value = "gauss2.txt", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct IrkTableArgs {
    /// Gauss2, Gauss3, Radau2 or Radau3
    #[arg(long)]
    pub algorithm: String,

    /// Comma-separated table with a header row and 9 columns
    #[arg(long, default_value = "data.txt", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct RcArgs {
    /// End time in seconds
    #[arg(long)]
    pub tend: f64,

    /// Number of integration steps
    #[arg(long)]
    pub steps: u64,

    /// Directory holding rc_<method>.txt files
    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    pub data_dir: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Output directory [default: current directory, `plots/RC` for rc]
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,

    /// Whether written charts are opened in a viewer
    #[arg(long, value_enum)]
    pub display: Option<DisplayArg>,

    /// JSON file with render settings (dpi, width_in, height_in, line_width, ...)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DisplayArg {
    Headless,
    Interactive,
}

/// Accepts any float and keeps the user's spelling.
fn numeric_text(raw: &str) -> Result<String, String> {
    raw.trim()
        .parse::<f64>()
        .map(|_| raw.to_string())
        .map_err(|err| format!("`{raw}` is not a number: {err}"))
}

impl From<DisplayArg> for DisplayMode {
    fn from(value: DisplayArg) -> Self {
        match value {
            DisplayArg::Headless => DisplayMode::Headless,
            DisplayArg::Interactive => DisplayMode::Interactive,
        }
    }
}
