use crate::error::PlotError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Implicit Runge-Kutta schemes whose output appears in the combined result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    Gauss2,
    Gauss3,
    Radau2,
    Radau3,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Gauss2,
        Algorithm::Gauss3,
        Algorithm::Radau2,
        Algorithm::Radau3,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Gauss2 => "Gauss2",
            Algorithm::Gauss3 => "Gauss3",
            Algorithm::Radau2 => "Radau2",
            Algorithm::Radau3 => "Radau3",
        }
    }

    /// (position, velocity) column indices in the combined table. Column 0 is time.
    pub fn columns(self) -> (usize, usize) {
        match self {
            Algorithm::Gauss2 => (1, 2),
            Algorithm::Gauss3 => (3, 4),
            Algorithm::Radau2 => (5, 6),
            Algorithm::Radau3 => (7, 8),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == s)
            .ok_or_else(|| PlotError::UnknownAlgorithm(s.to_string()))
    }
}

pub fn resolve_algorithm(name: &str) -> Result<(usize, usize), PlotError> {
    name.parse::<Algorithm>().map(Algorithm::columns)
}
