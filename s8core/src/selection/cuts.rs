//! Muon-in-jet selection cuts.
//!
//! Defaults reproduce the standard p_T^rel selection; a JSON file may
//! override any subset of them.

use serde::{Deserialize, Serialize};

use crate::algorithm::geometry::{delta_r, pt_rel};
use crate::btag::operating_point::{OperatingPoint, Tagger};
use crate::data::event::{Jet, Muon, PrimaryVertex};

/// Cut values applied by the event selector.
///
/// The vertex and cone upper bounds are exclusive, the cone lower bound is inclusive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionCuts {
    // Muon vertex compatibility with the primary vertex (cm)
    pub max_vertex_dz: f64,

    // Muon inside the jet cone but away from the axis
    pub min_delta_r: f64,
    pub max_delta_r: f64,

    // Sanity guard on p_T^rel, must be strictly above
    pub min_pt_rel: f64,

    // Away jet tag, compared against the TCHP discriminant
    pub away_tag: OperatingPoint,
}

impl Default for SelectionCuts {
    fn default() -> Self {
        Self {
            max_vertex_dz: 2.0,
            min_delta_r: 0.01,
            max_delta_r: 0.4,
            min_pt_rel: -1.0,
            away_tag: OperatingPoint::named("TCHPL", 1.19),
        }
    }
}

impl SelectionCuts {
    /// Check if the muon vertex is compatible with the primary vertex.
    #[inline]
    pub fn vertex_compatible(&self, muon: &Muon, primary_vertex: &PrimaryVertex) -> bool {
        (muon.vertex.z - primary_vertex.vertex.z).abs() < self.max_vertex_dz
    }

    /// Check if a muon is a muon-in-jet candidate for the given jet.
    #[inline]
    pub fn passes(&self, muon: &Muon, jet: &Jet, primary_vertex: &PrimaryVertex) -> bool {
        if !self.vertex_compatible(muon, primary_vertex) {
            return false;
        }

        let delta_r = delta_r(muon, jet);
        if delta_r < self.min_delta_r || delta_r >= self.max_delta_r {
            return false;
        }

        pt_rel(muon, jet) > self.min_pt_rel
    }

    /// Check if the away jet is tagged.
    #[inline]
    pub fn away_jet_tagged(&self, away_jet: &Jet) -> bool {
        self.away_tag.is_tagged(away_jet.btag(Tagger::Tchp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::event::{FourMomentum, Vertex};

    fn jet() -> Jet {
        Jet::new(FourMomentum::from_pt_eta_phi(60.0, 0.0, 0.0), 0.0, 0.0, 0)
    }

    fn muon_at(delta_eta: f64, z: f64) -> Muon {
        Muon::new(FourMomentum::from_pt_eta_phi(10.0, delta_eta, 0.0), Vertex::new(0.0, 0.0, z))
    }

    #[test]
    fn test_default_cuts() {
        let cuts = SelectionCuts::default();
        assert!(cuts.max_vertex_dz == 2.0);
        assert!(cuts.min_delta_r == 0.01);
        assert!(cuts.max_delta_r == 0.4);
        assert!(cuts.away_tag.threshold() == 1.19);
    }

    #[test]
    fn test_vertex_window_is_open() {
        let cuts = SelectionCuts::default();
        let pv = PrimaryVertex::new(Vertex::new(0.0, 0.0, 1.0));
        assert!(cuts.passes(&muon_at(0.2, 2.9), &jet(), &pv));
        assert!(cuts.passes(&muon_at(0.2, -0.9), &jet(), &pv));
        assert!(!cuts.passes(&muon_at(0.2, 3.0), &jet(), &pv));
        assert!(!cuts.passes(&muon_at(0.2, -1.0), &jet(), &pv));
    }

    #[test]
    fn test_cone_bounds() {
        let cuts = SelectionCuts::default();
        let pv = PrimaryVertex::default();
        assert!(!cuts.passes(&muon_at(0.0, 0.0), &jet(), &pv));
        assert!(!cuts.passes(&muon_at(0.005, 0.0), &jet(), &pv));
        assert!(cuts.passes(&muon_at(0.02, 0.0), &jet(), &pv));
        assert!(cuts.passes(&muon_at(0.39, 0.0), &jet(), &pv));
        assert!(!cuts.passes(&muon_at(0.41, 0.0), &jet(), &pv));
    }

    fn muon_at_phi(phi: f64, z: f64) -> Muon {
        Muon::new(FourMomentum::from_pt_eta_phi(10.0, 0.0, phi), Vertex::new(0.0, 0.0, z))
    }

    #[test]
    fn test_cone_edges() {
        let cuts = SelectionCuts::default();
        let pv = PrimaryVertex::default();
        // lower edge inclusive, upper edge exclusive
        assert!(cuts.passes(&muon_at_phi(0.01, 0.0), &jet(), &pv));
        assert!(!cuts.passes(&muon_at_phi(0.4, 0.0), &jet(), &pv));
    }

    #[test]
    fn test_vertex_window_edges() {
        let cuts = SelectionCuts::default();
        let pv = PrimaryVertex::default();
        assert!(!cuts.passes(&muon_at_phi(0.2, 2.0), &jet(), &pv));
        assert!(!cuts.passes(&muon_at_phi(0.2, -2.0), &jet(), &pv));
        assert!(cuts.passes(&muon_at_phi(0.2, 1.99), &jet(), &pv));
        assert!(cuts.passes(&muon_at_phi(0.2, -1.99), &jet(), &pv));
    }

    #[test]
    fn test_away_jet_tag_uses_tchp() {
        let cuts = SelectionCuts::default();
        let mut away = Jet::new(FourMomentum::default(), 10.0, 1.19, 0);
        assert!(!cuts.away_jet_tagged(&away));
        away.tchp = 1.2;
        assert!(cuts.away_jet_tagged(&away));
    }

    #[test]
    fn test_partial_json_override() {
        let cuts: SelectionCuts = serde_json::from_str(r#"{"max_delta_r": 0.5, "away_tag": "TCHPM"}"#).unwrap();
        assert_eq!(cuts.max_delta_r, 0.5);
        assert_eq!(cuts.min_delta_r, 0.01);
        assert_eq!(cuts.away_tag.threshold(), 1.93);
    }
}
