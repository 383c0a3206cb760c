use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Kind of input the converter runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Collision data, no generator-level flavour.
    Data,
    /// Simulation with flavour truth.
    MonteCarlo,
}

impl RunMode {
    pub fn from_data_flag(is_data: bool) -> Self {
        if is_data {
            RunMode::Data
        } else {
            RunMode::MonteCarlo
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, RunMode::Data)
    }

    /// Output subdirectory holding the histograms of this mode.
    pub fn output_directory(&self) -> &str {
        match self {
            RunMode::Data => "muon_in_jet",
            RunMode::MonteCarlo => "MCTruth",
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            RunMode::Data => "Data",
            RunMode::MonteCarlo => "Monte-Carlo",
        }
    }
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::MonteCarlo
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl From<bool> for RunMode {
    fn from(is_data: bool) -> Self {
        RunMode::from_data_flag(is_data)
    }
}
