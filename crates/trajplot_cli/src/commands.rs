//! Subcommand handlers. Each one loads its inputs, builds the chart set, and executes it.

use crate::cli::{IrkArgs, IrkTableArgs, RcArgs};
use crate::settings::resolve_settings;
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;
use trajplot_core::pipeline::{
    irk_single_jobs, irk_single_options, irk_table_jobs, irk_table_options, rc_jobs,
};
use trajplot_core::{execute, load_method_datasets, load_table, Algorithm, IrkRun, RcRun};

pub fn handle_irk(args: IrkArgs) -> Result<Vec<PathBuf>> {
    let algorithm: Algorithm = args.algorithm.parse()?;
    let settings = resolve_settings(&args.output)?;

    let table = load_table(&args.input, &irk_single_options())?;
    info!(input = %args.input.display(), rows = table.rows(), %algorithm, "loaded IRK run");

    let run = IrkRun {
        tend_relative: args.tend_relative,
        steps: args.steps,
        algorithm,
    };
    let jobs = irk_single_jobs(&table, &run)?;
    let out_dir = args.output.out_dir.unwrap_or_else(|| PathBuf::from("."));
    Ok(execute(&jobs, &out_dir, &settings)?)
}

pub fn handle_irk_table(args: IrkTableArgs) -> Result<Vec<PathBuf>> {
    let algorithm: Algorithm = args.algorithm.parse()?;
    let settings = resolve_settings(&args.output)?;

    let table = load_table(&args.input, &irk_table_options())?;
    info!(input = %args.input.display(), rows = table.rows(), %algorithm, "loaded IRK table");

    let jobs = irk_table_jobs(&table, algorithm)?;
    let out_dir = args.output.out_dir.unwrap_or_else(|| PathBuf::from("."));
    Ok(execute(&jobs, &out_dir, &settings)?)
}

pub fn handle_rc(args: RcArgs) -> Result<Vec<PathBuf>> {
    let settings = resolve_settings(&args.output)?;

    let datasets = load_method_datasets(&args.data_dir)?;
    info!(
        dir = %args.data_dir.display(),
        methods = ?datasets.methods(),
        "loaded RC datasets"
    );

    let run = RcRun {
        tend: args.tend,
        steps: args.steps,
    };
    let jobs = rc_jobs(&datasets, &run);
    let out_dir = args
        .output
        .out_dir
        .unwrap_or_else(|| PathBuf::from("plots").join("RC"));
    Ok(execute(&jobs, &out_dir, &settings)?)
}
