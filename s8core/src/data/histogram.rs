//! Two-dimensional frequency accumulator.
//!
//! Cells follow the ROOT convention: bin 0 is the underflow, bins `1..=n` are
//! the regular bins and bin `n + 1` is the overflow. Lower edges are inclusive,
//! upper edges exclusive.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Axis binning specification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Axis {
    /// Variable-width bins given by their edges (length = bins + 1).
    Variable(Vec<f64>),
    /// `bins` equal-width bins over `[low, high)`.
    Uniform { bins: usize, low: f64, high: f64 },
}

impl Axis {
    /// Validated bin edges of this axis.
    pub fn edges(&self) -> Result<Vec<f64>> {
        match self {
            Axis::Variable(edges) => {
                if edges.len() < 2 {
                    return Err(Error::InvalidBinning(format!(
                        "need at least two edges, got {}",
                        edges.len()
                    )));
                }
                if edges.iter().any(|e| !e.is_finite()) {
                    return Err(Error::InvalidBinning("non-finite bin edge".to_string()));
                }
                if edges.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(Error::InvalidBinning(format!(
                        "edges are not strictly increasing: {:?}",
                        edges
                    )));
                }
                Ok(edges.clone())
            }
            Axis::Uniform { bins, low, high } => {
                if *bins == 0 {
                    return Err(Error::InvalidBinning("uniform axis with zero bins".to_string()));
                }
                if !low.is_finite() || !high.is_finite() || low >= high {
                    return Err(Error::InvalidBinning(format!(
                        "invalid uniform range [{}, {})",
                        low, high
                    )));
                }
                let n = *bins as f64;
                let mut edges: Vec<f64> = (0..*bins).map(|i| low + (high - low) * i as f64 / n).collect();
                edges.push(*high);
                Ok(edges)
            }
        }
    }
}

/// Cell index along one axis, including under- and overflow.
fn find_cell(edges: &[f64], value: f64) -> usize {
    let n_bins = edges.len() - 1;
    if value.is_nan() || value < edges[0] {
        return 0;
    }
    if value >= edges[n_bins] {
        return n_bins + 1;
    }
    // first edge strictly greater than value
    edges.partition_point(|e| *e <= value)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram2D {
    pub name: String,
    pub title: String,
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    /// Cell contents, row-major in x: index = ix + (nx + 2) * iy.
    pub contents: Vec<f64>,
    /// Number of fill calls, flows included.
    pub entries: u64,
}

impl Histogram2D {
    /// Creates an empty histogram.
    ///
    /// # Arguments
    ///
    /// * `name` - Unique name inside the output directory.
    /// * `title` - Human readable title.
    /// * `x_axis`, `y_axis` - Binning of both axes.
    ///
    /// # Examples
    ///
    /// ```
    /// use s8core::data::histogram::{Axis, Histogram2D};
    ///
    /// let mut h = Histogram2D::new(
    ///     "n_pT",
    ///     "n p_{T}^rel vs p_{T}",
    ///     Axis::Variable(vec![30.0, 50.0, 80.0, 230.0]),
    ///     Axis::Uniform { bins: 50, low: 0.0, high: 5.0 },
    /// ).unwrap();
    /// h.fill(100.0, 1.5);
    /// assert_eq!(h.bin_content(3, 16), 1.0);
    /// ```
    pub fn new(name: &str, title: &str, x_axis: Axis, y_axis: Axis) -> Result<Self> {
        let x_edges = x_axis.edges()?;
        let y_edges = y_axis.edges()?;
        let cells = (x_edges.len() + 1) * (y_edges.len() + 1);
        Ok(Histogram2D {
            name: name.to_string(),
            title: title.to_string(),
            x_edges,
            y_edges,
            contents: vec![0.0; cells],
            entries: 0,
        })
    }

    pub fn nbins_x(&self) -> usize {
        self.x_edges.len() - 1
    }

    pub fn nbins_y(&self) -> usize {
        self.y_edges.len() - 1
    }

    fn cell(&self, ix: usize, iy: usize) -> usize {
        ix + (self.nbins_x() + 2) * iy
    }

    /// Cell coordinates of a point, flows included.
    pub fn find_bin(&self, x: f64, y: f64) -> (usize, usize) {
        (find_cell(&self.x_edges, x), find_cell(&self.y_edges, y))
    }

    /// Increments the cell containing `(x, y)` by one.
    pub fn fill(&mut self, x: f64, y: f64) {
        let (ix, iy) = self.find_bin(x, y);
        let cell = self.cell(ix, iy);
        self.contents[cell] += 1.0;
        self.entries += 1;
    }

    /// Content of cell `(ix, iy)`; out-of-range cells read as zero.
    pub fn bin_content(&self, ix: usize, iy: usize) -> f64 {
        if ix > self.nbins_x() + 1 || iy > self.nbins_y() + 1 {
            return 0.0;
        }
        self.contents[self.cell(ix, iy)]
    }

    /// Sum over the regular bins, flows excluded.
    pub fn integral(&self) -> f64 {
        let mut sum = 0.0;
        for iy in 1..=self.nbins_y() {
            for ix in 1..=self.nbins_x() {
                sum += self.contents[self.cell(ix, iy)];
            }
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt_axis() -> Axis {
        Axis::Variable(vec![30.0, 50.0, 80.0, 230.0])
    }

    fn pt_rel_axis() -> Axis {
        Axis::Uniform { bins: 50, low: 0.0, high: 5.0 }
    }

    #[test]
    fn test_find_cell_edges() {
        let edges = vec![30.0, 50.0, 80.0, 230.0];
        assert_eq!(find_cell(&edges, 29.9), 0);
        assert_eq!(find_cell(&edges, 30.0), 1);
        assert_eq!(find_cell(&edges, 49.99), 1);
        assert_eq!(find_cell(&edges, 50.0), 2);
        assert_eq!(find_cell(&edges, 229.0), 3);
        assert_eq!(find_cell(&edges, 230.0), 4);
        assert_eq!(find_cell(&edges, f64::NAN), 0);
    }

    #[test]
    fn test_uniform_edges() {
        let edges = pt_rel_axis().edges().unwrap();
        assert_eq!(edges.len(), 51);
        assert_eq!(edges[0], 0.0);
        assert!((edges[15] - 1.5).abs() < 1e-12);
        assert_eq!(edges[50], 5.0);
    }

    #[test]
    fn test_fill_and_flows() {
        let mut h = Histogram2D::new("h", "t", pt_axis(), pt_rel_axis()).unwrap();
        h.fill(40.0, 0.05);
        h.fill(40.0, 0.05);
        h.fill(500.0, 1.0);
        h.fill(10.0, -1.0);

        assert_eq!(h.bin_content(1, 1), 2.0);
        assert_eq!(h.bin_content(4, 11), 1.0);
        assert_eq!(h.bin_content(0, 0), 1.0);
        assert_eq!(h.entries, 4);
        assert_eq!(h.integral(), 2.0);
        assert_eq!(h.bin_content(99, 0), 0.0);
    }

    #[test]
    fn test_invalid_binning() {
        let unsorted = Histogram2D::new("h", "t", Axis::Variable(vec![30.0, 20.0]), pt_rel_axis());
        assert!(matches!(unsorted, Err(Error::InvalidBinning(_))));

        let single_edge = Histogram2D::new("h", "t", Axis::Variable(vec![30.0]), pt_rel_axis());
        assert!(matches!(single_edge, Err(Error::InvalidBinning(_))));

        let empty_range = Histogram2D::new("h", "t", pt_axis(), Axis::Uniform { bins: 10, low: 5.0, high: 5.0 });
        assert!(matches!(empty_range, Err(Error::InvalidBinning(_))));

        let no_bins = Histogram2D::new("h", "t", pt_axis(), Axis::Uniform { bins: 0, low: 0.0, high: 5.0 });
        assert!(matches!(no_bins, Err(Error::InvalidBinning(_))));
    }
}
