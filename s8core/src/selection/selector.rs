use std::fmt;
use std::fmt::{Display, Formatter};

use tracing::trace;

use crate::data::event::{Event, Jet, Muon, PrimaryVertex};
use crate::error::Result;
use crate::plots::routing::Plots;
use crate::selection::cuts::SelectionCuts;

/// Counters collected while analysing events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionStats {
    pub events: u64,
    /// Fewer than two jets, no muons or no primary vertex.
    pub skipped_events: u64,
    pub jets_without_muon: u64,
    pub jets_without_away_jet: u64,
    /// Pairs recorded into the "n" sample.
    pub n_pairs: u64,
    /// Pairs recorded into the "p" sample.
    pub p_pairs: u64,
}

impl Display for SelectionStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "events: {}, skipped: {}, jets without muon: {}, jets without away jet: {}, n pairs: {}, p pairs: {}",
            self.events,
            self.skipped_events,
            self.jets_without_muon,
            self.jets_without_away_jet,
            self.n_pairs,
            self.p_pairs
        )
    }
}

/// Muon-in-jet event selection feeding the "n" and "p" samples.
#[derive(Clone, Debug, Default)]
pub struct EventSelector {
    cuts: SelectionCuts,
    stats: SelectionStats,
}

impl EventSelector {
    pub fn new(cuts: SelectionCuts) -> Self {
        EventSelector { cuts, stats: SelectionStats::default() }
    }

    pub fn cuts(&self) -> &SelectionCuts {
        &self.cuts
    }

    pub fn stats(&self) -> &SelectionStats {
        &self.stats
    }

    /// Highest-pt muon passing the cuts for `jet`; the first one wins a tie.
    pub fn find_muon_in_jet<'a>(
        &self,
        muons: &'a [Muon],
        jet: &Jet,
        primary_vertex: &PrimaryVertex,
    ) -> Option<&'a Muon> {
        let mut muon_in_jet: Option<&Muon> = None;
        for muon in muons {
            if !self.cuts.passes(muon, jet, primary_vertex) {
                continue;
            }
            if let Some(best) = muon_in_jet {
                if best.p4.pt() >= muon.p4.pt() {
                    continue;
                }
            }
            muon_in_jet = Some(muon);
        }
        muon_in_jet
    }

    /// Highest-pt jet other than `jets[index]`; the first one wins a tie.
    pub fn find_away_jet<'a>(&self, jets: &'a [Jet], index: usize) -> Option<&'a Jet> {
        let mut away_jet: Option<&Jet> = None;
        for (i, jet) in jets.iter().enumerate() {
            if i == index {
                continue;
            }
            if let Some(best) = away_jet {
                if best.p4.pt() >= jet.p4.pt() {
                    continue;
                }
            }
            away_jet = Some(jet);
        }
        away_jet
    }

    /// Selects muon-jet pairs of one event.
    ///
    /// Every jet with a muon candidate and an away jet goes to `n`; the same
    /// pair also goes to `p` when the away jet is tagged.
    ///
    /// # Arguments
    ///
    /// * `event` - The event, left untouched.
    /// * `n` - Sink for all selected pairs.
    /// * `p` - Sink for pairs with a tagged away jet.
    pub fn analyze(&mut self, event: &Event, n: &mut dyn Plots, p: &mut dyn Plots) -> Result<()> {
        self.stats.events += 1;

        if event.jets.len() < 2 || event.muons.is_empty() {
            self.stats.skipped_events += 1;
            return Ok(());
        }

        let primary_vertex = match event.primary_vertex() {
            Some(pv) => pv,
            None => {
                trace!("event without primary vertex skipped");
                self.stats.skipped_events += 1;
                return Ok(());
            }
        };

        for (index, jet) in event.jets.iter().enumerate() {
            let muon_in_jet = match self.find_muon_in_jet(&event.muons, jet, primary_vertex) {
                Some(muon) => muon,
                None => {
                    self.stats.jets_without_muon += 1;
                    continue;
                }
            };

            let away_jet = match self.find_away_jet(&event.jets, index) {
                Some(away) => away,
                None => {
                    self.stats.jets_without_away_jet += 1;
                    continue;
                }
            };

            // (n) muon-jet + away-jet
            n.fill(muon_in_jet, jet)?;
            self.stats.n_pairs += 1;

            if !self.cuts.away_jet_tagged(away_jet) {
                continue;
            }

            // (p) muon-jet + tagged away-jet
            p.fill(muon_in_jet, jet)?;
            self.stats.p_pairs += 1;
        }

        Ok(())
    }
}
