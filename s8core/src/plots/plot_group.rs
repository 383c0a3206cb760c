use tracing::error;

use crate::algorithm::geometry::pt_rel;
use crate::btag::operating_point::{OperatingPoint, Tagger};
use crate::data::event::{Jet, Muon};
use crate::data::histogram::{Axis, Histogram2D};
use crate::error::{Error, Result};

/// Destination the histograms persist themselves into.
pub trait HistogramSink {
    fn write(&mut self, histogram: &Histogram2D) -> Result<()>;
}

/// Binning of the p_T^rel vs p_T plane.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotBinning {
    pub pt: Axis,
    pub pt_rel: Axis,
}

impl Default for PlotBinning {
    fn default() -> Self {
        PlotBinning {
            pt: Axis::Variable(vec![30.0, 50.0, 80.0, 230.0]),
            pt_rel: Axis::Uniform { bins: 50, low: 0.0, high: 5.0 },
        }
    }
}

#[derive(Debug)]
struct Accumulators {
    all: Histogram2D,
    tag: Histogram2D,
}

/// All and tagged muon-jet pairs over (jet p_T, p_T^rel).
///
/// A binning rejected at construction is kept as the group state; every
/// later `fill` or `save` reports it as `Error::Uninitialized`.
#[derive(Debug)]
pub struct PlotGroup {
    name: String,
    accumulators: std::result::Result<Accumulators, String>,
    operating_point: OperatingPoint,
}

impl PlotGroup {
    /// Creates the group with the standard binning.
    ///
    /// # Arguments
    ///
    /// * `prefix` - Sample name, `n` or `p`.
    /// * `suffix` - Flavour name, empty for unflavoured plots.
    pub fn new(prefix: &str, suffix: &str) -> Self {
        PlotGroup::with_binning(prefix, suffix, &PlotBinning::default())
    }

    pub fn with_binning(prefix: &str, suffix: &str, binning: &PlotBinning) -> Self {
        let new_suffix = if suffix.is_empty() {
            "_pT".to_string()
        } else {
            format!("_pT_{}", suffix)
        };
        let name = format!("{}{}", prefix, new_suffix);

        let accumulators = Histogram2D::new(
            &name,
            &format!("{} p_{{T}}^rel vs p_{{T}} {}", prefix, suffix),
            binning.pt.clone(),
            binning.pt_rel.clone(),
        )
        .and_then(|all| {
            let tag = Histogram2D::new(
                &format!("{}tag{}", prefix, new_suffix),
                &format!("{} tag p_{{T}}^rel vs p_{{T}} {}", prefix, suffix),
                binning.pt.clone(),
                binning.pt_rel.clone(),
            )?;
            Ok(Accumulators { all, tag })
        })
        .map_err(|e| {
            error!(plots = %name, error = %e, "failed to create plots");
            e.to_string()
        });

        PlotGroup {
            name,
            accumulators,
            operating_point: OperatingPoint::from_threshold(0.0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.accumulators.is_ok()
    }

    pub fn operating_point(&self) -> &OperatingPoint {
        &self.operating_point
    }

    pub fn set_operating_point(&mut self, operating_point: &OperatingPoint) {
        self.operating_point = operating_point.clone();
    }

    fn uninitialized(&self, reason: &str) -> Error {
        Error::Uninitialized { name: self.name.clone(), reason: reason.to_string() }
    }

    /// Histogram of all pairs.
    pub fn all(&self) -> Result<&Histogram2D> {
        match &self.accumulators {
            Ok(acc) => Ok(&acc.all),
            Err(reason) => Err(self.uninitialized(reason)),
        }
    }

    /// Histogram of pairs whose jet passes the operating point.
    pub fn tag(&self) -> Result<&Histogram2D> {
        match &self.accumulators {
            Ok(acc) => Ok(&acc.tag),
            Err(reason) => Err(self.uninitialized(reason)),
        }
    }

    pub fn fill(&mut self, muon: &Muon, jet: &Jet) -> Result<()> {
        let acc = match &mut self.accumulators {
            Ok(acc) => acc,
            Err(reason) => {
                return Err(Error::Uninitialized { name: self.name.clone(), reason: reason.clone() })
            }
        };

        let pt = jet.p4.pt();
        let pt_rel = pt_rel(muon, jet);

        acc.all.fill(pt, pt_rel);
        if self.operating_point.is_tagged(jet.btag(Tagger::Tche)) {
            acc.tag.fill(pt, pt_rel);
        }
        Ok(())
    }

    pub fn save(&self, sink: &mut dyn HistogramSink) -> Result<()> {
        sink.write(self.all()?)?;
        sink.write(self.tag()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::event::{FourMomentum, Vertex};

    #[derive(Default)]
    struct MemorySink {
        written: Vec<Histogram2D>,
    }

    impl HistogramSink for MemorySink {
        fn write(&mut self, histogram: &Histogram2D) -> Result<()> {
            self.written.push(histogram.clone());
            Ok(())
        }
    }

    fn pair(tche: f64) -> (Muon, Jet) {
        let jet = Jet::new(FourMomentum::new(100.0, 0.0, 0.0, 100.0), tche, 0.0, 5);
        let muon = Muon::new(FourMomentum::new(8.0, 1.5, 0.0, 8.2), Vertex::default());
        (muon, jet)
    }

    #[test]
    fn test_names_and_titles() {
        let plain = PlotGroup::new("n", "");
        assert_eq!(plain.all().unwrap().name, "n_pT");
        assert_eq!(plain.tag().unwrap().name, "ntag_pT");

        let flavoured = PlotGroup::new("p", "b");
        assert_eq!(flavoured.all().unwrap().name, "p_pT_b");
        assert_eq!(flavoured.tag().unwrap().name, "ptag_pT_b");
        assert_eq!(flavoured.all().unwrap().title, "p p_{T}^rel vs p_{T} b");
        assert_eq!(flavoured.tag().unwrap().title, "p tag p_{T}^rel vs p_{T} b");
    }

    #[test]
    fn test_fill_tagged_and_untagged() {
        let mut group = PlotGroup::new("n", "");
        group.set_operating_point(&OperatingPoint::parse("TCHEM").unwrap());

        let (muon, tagged) = pair(5.0);
        group.fill(&muon, &tagged).unwrap();
        let (muon, untagged) = pair(1.0);
        group.fill(&muon, &untagged).unwrap();

        let all = group.all().unwrap();
        let tag = group.tag().unwrap();
        assert_eq!(all.bin_content(3, 16), 2.0);
        assert_eq!(tag.bin_content(3, 16), 1.0);
    }

    #[test]
    fn test_score_at_threshold_is_not_tagged() {
        let mut group = PlotGroup::new("n", "");
        group.set_operating_point(&OperatingPoint::from_threshold(3.3));
        let (muon, jet) = pair(3.3);
        group.fill(&muon, &jet).unwrap();
        assert_eq!(group.all().unwrap().entries, 1);
        assert_eq!(group.tag().unwrap().entries, 0);
    }

    #[test]
    fn test_tag_never_exceeds_all() {
        let mut group = PlotGroup::new("n", "");
        group.set_operating_point(&OperatingPoint::from_threshold(2.0));
        for i in 0..40 {
            let (muon, mut jet) = pair(i as f64 * 0.1);
            jet.p4 = FourMomentum::new(20.0 + 6.0 * i as f64, 0.0, 0.0, 300.0);
            group.fill(&muon, &jet).unwrap();
        }
        let all = group.all().unwrap();
        let tag = group.tag().unwrap();
        for (a, t) in all.contents.iter().zip(tag.contents.iter()) {
            assert!(t <= a);
        }
    }

    #[test]
    fn test_failed_binning_is_sticky() {
        let binning = PlotBinning {
            pt: Axis::Variable(vec![80.0, 50.0]),
            pt_rel: Axis::Uniform { bins: 50, low: 0.0, high: 5.0 },
        };
        let mut group = PlotGroup::with_binning("n", "b", &binning);
        assert!(!group.is_initialized());

        let (muon, jet) = pair(5.0);
        for _ in 0..2 {
            match group.fill(&muon, &jet) {
                Err(Error::Uninitialized { name, .. }) => assert_eq!(name, "n_pT_b"),
                other => panic!("expected uninitialized error, got {other:?}"),
            }
        }

        let mut sink = MemorySink::default();
        assert!(matches!(group.save(&mut sink), Err(Error::Uninitialized { .. })));
        assert!(sink.written.is_empty());
    }

    #[test]
    fn test_save_twice_is_identical() {
        let mut group = PlotGroup::new("n", "");
        let (muon, jet) = pair(5.0);
        group.fill(&muon, &jet).unwrap();

        let mut sink = MemorySink::default();
        group.save(&mut sink).unwrap();
        group.save(&mut sink).unwrap();
        assert_eq!(sink.written.len(), 4);
        assert_eq!(sink.written[0], sink.written[2]);
        assert_eq!(sink.written[1], sink.written[3]);
    }
}
