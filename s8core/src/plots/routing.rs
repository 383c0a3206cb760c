use crate::btag::operating_point::OperatingPoint;
use crate::data::event::{Jet, Muon};
use crate::data::run_mode::RunMode;
use crate::error::Result;
use crate::plots::plot_group::{HistogramSink, PlotGroup};

/// Sink for selected muon-jet pairs.
pub trait Plots {
    // Apply the in-jet tag threshold to every owned group
    fn set_operating_point(&mut self, operating_point: &OperatingPoint);
    // Route one pair to the matching group(s)
    fn fill(&mut self, muon: &Muon, jet: &Jet) -> Result<()>;
    // Persist every owned group, in a fixed order
    fn save(&self, sink: &mut dyn HistogramSink) -> Result<()>;
    // Owned groups in save order
    fn groups(&self) -> Vec<&PlotGroup>;
}

/// Jet flavour classes kept by the measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlavourGroup {
    B,
    /// Charm, light quarks and gluons.
    Cl,
}

const FLAVOUR_GROUPS: [(i32, FlavourGroup); 6] = [
    (5, FlavourGroup::B),
    (1, FlavourGroup::Cl),
    (2, FlavourGroup::Cl),
    (3, FlavourGroup::Cl),
    (4, FlavourGroup::Cl),
    (21, FlavourGroup::Cl),
];

impl FlavourGroup {
    /// Group of a generator-level flavour code; `None` drops the jet.
    pub fn from_code(code: i32) -> Option<FlavourGroup> {
        FLAVOUR_GROUPS
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, group)| *group)
    }

    pub fn to_str(&self) -> &str {
        match self {
            FlavourGroup::B => "b",
            FlavourGroup::Cl => "cl",
        }
    }
}

/// Real data: one group, no flavour split.
#[derive(Debug)]
pub struct NonFlavouredPlots {
    plots: PlotGroup,
}

impl NonFlavouredPlots {
    pub fn new(prefix: &str) -> Self {
        NonFlavouredPlots { plots: PlotGroup::new(prefix, "") }
    }
}

impl Plots for NonFlavouredPlots {
    fn set_operating_point(&mut self, operating_point: &OperatingPoint) {
        self.plots.set_operating_point(operating_point);
    }

    fn fill(&mut self, muon: &Muon, jet: &Jet) -> Result<()> {
        self.plots.fill(muon, jet)
    }

    fn save(&self, sink: &mut dyn HistogramSink) -> Result<()> {
        self.plots.save(sink)
    }

    fn groups(&self) -> Vec<&PlotGroup> {
        vec![&self.plots]
    }
}

/// Simulation: b jets and charm/light/gluon jets in separate groups.
#[derive(Debug)]
pub struct FlavouredPlots {
    b: PlotGroup,
    cl: PlotGroup,
}

impl FlavouredPlots {
    pub fn new(prefix: &str) -> Self {
        FlavouredPlots {
            b: PlotGroup::new(prefix, FlavourGroup::B.to_str()),
            cl: PlotGroup::new(prefix, FlavourGroup::Cl.to_str()),
        }
    }

    pub fn group(&self, flavour: FlavourGroup) -> &PlotGroup {
        match flavour {
            FlavourGroup::B => &self.b,
            FlavourGroup::Cl => &self.cl,
        }
    }
}

impl Plots for FlavouredPlots {
    fn set_operating_point(&mut self, operating_point: &OperatingPoint) {
        self.b.set_operating_point(operating_point);
        self.cl.set_operating_point(operating_point);
    }

    fn fill(&mut self, muon: &Muon, jet: &Jet) -> Result<()> {
        match FlavourGroup::from_code(jet.flavour) {
            Some(FlavourGroup::B) => self.b.fill(muon, jet),
            Some(FlavourGroup::Cl) => self.cl.fill(muon, jet),
            None => Ok(()),
        }
    }

    fn save(&self, sink: &mut dyn HistogramSink) -> Result<()> {
        self.b.save(sink)?;
        self.cl.save(sink)
    }

    fn groups(&self) -> Vec<&PlotGroup> {
        vec![&self.b, &self.cl]
    }
}

/// Plots variant matching the run mode.
pub fn plots_for(run_mode: RunMode, prefix: &str) -> Box<dyn Plots> {
    match run_mode {
        RunMode::Data => Box::new(NonFlavouredPlots::new(prefix)),
        RunMode::MonteCarlo => Box::new(FlavouredPlots::new(prefix)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::event::{FourMomentum, Vertex};
    use crate::data::histogram::Histogram2D;

    #[derive(Default)]
    struct NameSink {
        names: Vec<String>,
    }

    impl HistogramSink for NameSink {
        fn write(&mut self, histogram: &Histogram2D) -> Result<()> {
            self.names.push(histogram.name.clone());
            Ok(())
        }
    }

    fn pair(flavour: i32) -> (Muon, Jet) {
        let jet = Jet::new(FourMomentum::new(60.0, 0.0, 0.0, 60.0), 5.0, 0.0, flavour);
        let muon = Muon::new(FourMomentum::new(6.0, 1.0, 0.0, 6.1), Vertex::default());
        (muon, jet)
    }

    fn entries(group: &PlotGroup) -> u64 {
        group.all().unwrap().entries
    }

    #[test]
    fn test_flavour_lookup() {
        assert_eq!(FlavourGroup::from_code(5), Some(FlavourGroup::B));
        for code in [1, 2, 3, 4, 21] {
            assert_eq!(FlavourGroup::from_code(code), Some(FlavourGroup::Cl));
        }
        for code in [0, -5, 6, 11, 13, 22] {
            assert_eq!(FlavourGroup::from_code(code), None);
        }
    }

    #[test]
    fn test_flavoured_routing() {
        let mut plots = FlavouredPlots::new("n");
        let codes = [5, 5, 1, 2, 3, 4, 21, 0, 6, 22, -5];
        for code in codes {
            let (muon, jet) = pair(code);
            plots.fill(&muon, &jet).unwrap();
        }
        assert_eq!(entries(plots.group(FlavourGroup::B)), 2);
        assert_eq!(entries(plots.group(FlavourGroup::Cl)), 5);
    }

    #[test]
    fn test_non_flavoured_takes_everything() {
        let mut plots = NonFlavouredPlots::new("p");
        for code in [0, 5, 22] {
            let (muon, jet) = pair(code);
            plots.fill(&muon, &jet).unwrap();
        }
        assert_eq!(entries(plots.groups()[0]), 3);
    }

    #[test]
    fn test_save_order() {
        let mut sink = NameSink::default();
        plots_for(RunMode::MonteCarlo, "n").save(&mut sink).unwrap();
        plots_for(RunMode::Data, "p").save(&mut sink).unwrap();
        assert_eq!(sink.names, vec!["n_pT_b", "ntag_pT_b", "n_pT_cl", "ntag_pT_cl", "p_pT", "ptag_pT"]);
    }

    #[test]
    fn test_operating_point_reaches_all_groups() {
        let mut plots = plots_for(RunMode::MonteCarlo, "n");
        let op = OperatingPoint::parse("TCHET").unwrap();
        plots.set_operating_point(&op);
        for group in plots.groups() {
            assert_eq!(group.operating_point(), &op);
        }
    }
}
