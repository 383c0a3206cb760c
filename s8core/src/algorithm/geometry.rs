use crate::data::event::{FourMomentum, Jet, Muon};

/// Angular separation between the muon and the jet axis.
pub fn delta_r(muon: &Muon, jet: &Jet) -> f64 {
    muon.p4.delta_r(&jet.p4)
}

/// Muon momentum component transverse to the jet axis (p_T^rel).
///
/// # Arguments
///
/// * `muon` - The muon candidate.
/// * `jet` - The jet whose momentum defines the axis.
///
/// # Examples
///
/// ```
/// use s8core::algorithm::geometry::pt_rel;
/// use s8core::data::event::{FourMomentum, Jet, Muon, Vertex};
///
/// let jet = Jet::new(FourMomentum::new(100.0, 0.0, 0.0, 100.0), 0.0, 0.0, 0);
/// let muon = Muon::new(FourMomentum::new(8.0, 1.5, 0.0, 8.2), Vertex::default());
/// assert!((pt_rel(&muon, &jet) - 1.5).abs() < 1e-12);
/// ```
pub fn pt_rel(muon: &Muon, jet: &Jet) -> f64 {
    perp(&muon.p4, &jet.p4)
}

// |p|^2 - (p . axis)^2 / |axis|^2, clamped at zero
fn perp(p: &FourMomentum, axis: &FourMomentum) -> f64 {
    let p = p.vect();
    let axis = axis.vect();
    let axis_mag2 = axis.norm_squared();
    let mut perp2 = p.norm_squared();
    if axis_mag2 > 0.0 {
        let projection = p.dot(&axis);
        perp2 -= projection * projection / axis_mag2;
    }
    perp2.max(0.0).sqrt()
}
