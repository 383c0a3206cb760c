use std::f64::consts::PI;
use std::fmt;
use std::fmt::Formatter;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::btag::operating_point::Tagger;

// pseudorapidity reported for momenta along the beam axis
const ETA_ON_AXIS: f64 = 1e10;

/// Lorentz four-momentum in GeV.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FourMomentum {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e: f64,
}

impl FourMomentum {
    /// Creates a new `FourMomentum` instance.
    ///
    /// # Arguments
    ///
    /// * `px`, `py`, `pz` - Cartesian momentum components.
    /// * `e` - Energy.
    ///
    /// # Examples
    ///
    /// ```
    /// use s8core::data::event::FourMomentum;
    ///
    /// let p4 = FourMomentum::new(3.0, 4.0, 0.0, 5.0);
    /// assert_eq!(p4.pt(), 5.0);
    /// ```
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        FourMomentum { px, py, pz, e }
    }

    /// Builds a massless four-momentum from (pt, eta, phi).
    pub fn from_pt_eta_phi(pt: f64, eta: f64, phi: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let e = (px * px + py * py + pz * pz).sqrt();
        FourMomentum { px, py, pz, e }
    }

    /// The momentum three-vector.
    pub fn vect(&self) -> Vector3<f64> {
        Vector3::new(self.px, self.py, self.pz)
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Pseudorapidity. Momenta along the beam axis map to +/-1e10.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            return if self.pz >= 0.0 { ETA_ON_AXIS } else { -ETA_ON_AXIS };
        }
        (self.pz / pt).asinh()
    }

    /// Azimuthal angle in (-pi, pi].
    pub fn phi(&self) -> f64 {
        if self.px == 0.0 && self.py == 0.0 {
            return 0.0;
        }
        self.py.atan2(self.px)
    }

    /// Angular separation sqrt(deta^2 + dphi^2), dphi wrapped into [-pi, pi].
    pub fn delta_r(&self, other: &FourMomentum) -> f64 {
        let deta = self.eta() - other.eta();
        let dphi = delta_phi(self.phi(), other.phi());
        deta.hypot(dphi)
    }
}

impl fmt::Display for FourMomentum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "(px: {}, py: {}, pz: {}, e: {})", self.px, self.py, self.pz, self.e)
    }
}

fn delta_phi(a: f64, b: f64) -> f64 {
    let mut dphi = a - b;
    while dphi > PI {
        dphi -= 2.0 * PI;
    }
    while dphi <= -PI {
        dphi += 2.0 * PI;
    }
    dphi
}

/// Spatial position in cm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vertex { x, y, z }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Jet {
    pub p4: FourMomentum,
    /// Track counting high efficiency discriminant.
    pub tche: f64,
    /// Track counting high purity discriminant.
    pub tchp: f64,
    /// Generator-level parton flavour, 0 for real data.
    #[serde(default)]
    pub flavour: i32,
}

impl Jet {
    pub fn new(p4: FourMomentum, tche: f64, tchp: f64, flavour: i32) -> Self {
        Jet { p4, tche, tchp, flavour }
    }

    /// Discriminant score of the given tagger.
    pub fn btag(&self, tagger: Tagger) -> f64 {
        match tagger {
            Tagger::Tche => self.tche,
            Tagger::Tchp => self.tchp,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Muon {
    pub p4: FourMomentum,
    pub vertex: Vertex,
}

impl Muon {
    pub fn new(p4: FourMomentum, vertex: Vertex) -> Self {
        Muon { p4, vertex }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryVertex {
    pub vertex: Vertex,
}

impl PrimaryVertex {
    pub fn new(vertex: Vertex) -> Self {
        PrimaryVertex { vertex }
    }
}

/// One reconstructed collision. Collections keep the order of the input record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub jets: Vec<Jet>,
    #[serde(default)]
    pub muons: Vec<Muon>,
    #[serde(default)]
    pub primary_vertices: Vec<PrimaryVertex>,
}

impl Event {
    pub fn new(jets: Vec<Jet>, muons: Vec<Muon>, primary_vertices: Vec<PrimaryVertex>) -> Self {
        Event { jets, muons, primary_vertices }
    }

    /// The reference vertex of the event: the first primary vertex.
    pub fn primary_vertex(&self) -> Option<&PrimaryVertex> {
        self.primary_vertices.first()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event(jets: {}, muons: {}, primary vertices: {})",
            self.jets.len(),
            self.muons.len(),
            self.primary_vertices.len()
        )
    }
}
