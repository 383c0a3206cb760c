// data module
pub mod data {
    pub mod event;
    pub mod histogram;
    pub mod run_mode;
}

// algorithm module
pub mod algorithm {
    pub mod geometry;
}

// b-tag operating points
pub mod btag {
    pub mod operating_point;
}

// plot groups and flavour routing
pub mod plots {
    pub mod plot_group;
    pub mod routing;
}

// muon-in-jet selection
pub mod selection {
    pub mod cuts;
    pub mod selector;
}

pub mod error;

pub use btag::operating_point::{OperatingPoint, Tagger};
pub use data::event::{Event, FourMomentum, Jet, Muon, PrimaryVertex, Vertex};
pub use data::histogram::{Axis, Histogram2D};
pub use data::run_mode::RunMode;
pub use error::{Error, Result};
pub use plots::plot_group::{HistogramSink, PlotBinning, PlotGroup};
pub use plots::routing::{plots_for, FlavourGroup, FlavouredPlots, NonFlavouredPlots, Plots};
pub use selection::cuts::SelectionCuts;
pub use selection::selector::{EventSelector, SelectionStats};
