//! RC-circuit integrator output, one file per method.

use crate::chart::Rgb;
use crate::error::{PlotError, Result};
use crate::table::{load_table, LoadOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Integration methods of the RC test program. Ordering is plotting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RcMethod {
    Explicit,
    Improved,
    Implicit,
    CrankNicolson,
}

impl RcMethod {
    pub const ALL: [RcMethod; 4] = [
        RcMethod::Explicit,
        RcMethod::Improved,
        RcMethod::Implicit,
        RcMethod::CrankNicolson,
    ];

    /// Short name used in file names and legends.
    pub fn name(self) -> &'static str {
        match self {
            RcMethod::Explicit => "explicit",
            RcMethod::Improved => "improved",
            RcMethod::Implicit => "implicit",
            RcMethod::CrankNicolson => "CN",
        }
    }

    pub fn file_name(self) -> String {
        format!("rc_{}.txt", self.name())
    }

    pub fn color(self) -> Rgb {
        match self {
            RcMethod::Explicit => Rgb(31, 119, 180),
            RcMethod::Improved => Rgb(255, 127, 14),
            RcMethod::Implicit => Rgb(44, 160, 44),
            RcMethod::CrankNicolson => Rgb(214, 39, 40),
        }
    }
}

impl fmt::Display for RcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// (time, capacitor voltage) series for every method whose file was found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodDatasets {
    series: BTreeMap<RcMethod, Vec<(f64, f64)>>,
}

impl MethodDatasets {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn methods(&self) -> Vec<RcMethod> {
        self.series.keys().copied().collect()
    }

    pub fn get(&self, method: RcMethod) -> Option<&[(f64, f64)]> {
        self.series.get(&method).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RcMethod, &[(f64, f64)])> {
        self.series.iter().map(|(m, s)| (*m, s.as_slice()))
    }

    pub fn insert(&mut self, method: RcMethod, series: Vec<(f64, f64)>) {
        self.series.insert(method, series);
    }
}

/// Loads `rc_<method>.txt` from `dir` for every method whose file exists.
///
/// Missing files are skipped; a present but malformed file is an error, and so is finding
/// no file at all.
pub fn load_method_datasets(dir: impl AsRef<Path>) -> Result<MethodDatasets> {
    let dir = dir.as_ref();
    // t, U_C, I
    let options = LoadOptions::whitespace().columns([0, 1, 2]);
    let mut datasets = MethodDatasets::default();

    for method in RcMethod::ALL {
        let path = dir.join(method.file_name());
        if !path.is_file() {
            debug!(path = %path.display(), "no data for method, skipping");
            continue;
        }
        let table = load_table(&path, &options)?;
        datasets.insert(method, table.pairs(0, 1)?);
    }

    if datasets.is_empty() {
        return Err(PlotError::NoData {
            dir: dir.to_path_buf(),
        });
    }
    Ok(datasets)
}
