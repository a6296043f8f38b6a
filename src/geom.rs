//! Dimension-tagged geometry containers.
//!
//! Coordinates are plain `f64` sequences, nested the way GeoJSON nests them
//! (`Vec<f64>` per position, one more `Vec` per container level), tagged with
//! an explicit [`Layout`] saying which of X, Y, Z and M are present. X is
//! longitude, Y is latitude, Z is elevation in meters, and M is a measure
//! slot that the GPX mapping uses for seconds since the Unix epoch.

use serde::{Deserialize, Serialize};

/// The set of coordinate dimensions a geometry value carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    Xy,
    Xyz,
    Xym,
    Xyzm,
}

impl Layout {
    /// Number of values per coordinate.
    pub fn dim(self) -> usize {
        match self {
            Layout::Xy => 2,
            Layout::Xyz | Layout::Xym => 3,
            Layout::Xyzm => 4,
        }
    }

    pub fn has_z(self) -> bool {
        matches!(self, Layout::Xyz | Layout::Xyzm)
    }

    pub fn has_m(self) -> bool {
        matches!(self, Layout::Xym | Layout::Xyzm)
    }

    /// Index of the Z slot within a coordinate, if the layout has one.
    pub fn z_index(self) -> Option<usize> {
        match self {
            Layout::Xyz | Layout::Xyzm => Some(2),
            _ => None,
        }
    }

    /// Index of the M slot within a coordinate, if the layout has one.
    pub fn m_index(self) -> Option<usize> {
        match self {
            Layout::Xym => Some(2),
            Layout::Xyzm => Some(3),
            _ => None,
        }
    }
}

/// A single position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub layout: Layout,
    pub coords: Vec<f64>,
}

impl Point {
    /// Creates a point from one coordinate.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate arity does not match the layout.
    pub fn new(layout: Layout, coords: Vec<f64>) -> Self {
        assert_eq!(coords.len(), layout.dim(), "coordinate arity mismatch");
        Self { layout, coords }
    }

    pub fn x(&self) -> f64 {
        self.coords[0]
    }

    pub fn y(&self) -> f64 {
        self.coords[1]
    }

    /// Z value, when the layout carries one.
    pub fn z(&self) -> Option<f64> {
        self.layout.z_index().map(|i| self.coords[i])
    }

    /// M value, when the layout carries one.
    pub fn m(&self) -> Option<f64> {
        self.layout.m_index().map(|i| self.coords[i])
    }
}

/// An ordered coordinate sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    pub layout: Layout,
    pub coords: Vec<Vec<f64>>,
}

impl LineString {
    /// Creates a line string from a coordinate sequence.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate's arity does not match the layout.
    pub fn new(layout: Layout, coords: Vec<Vec<f64>>) -> Self {
        for c in &coords {
            assert_eq!(c.len(), layout.dim(), "coordinate arity mismatch");
        }
        Self { layout, coords }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// An ordered sequence of coordinate sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiLineString {
    pub layout: Layout,
    pub coords: Vec<Vec<Vec<f64>>>,
}

impl MultiLineString {
    /// Creates a multi-line-string from nested coordinate sequences.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate's arity does not match the layout.
    pub fn new(layout: Layout, coords: Vec<Vec<Vec<f64>>>) -> Self {
        for line in &coords {
            for c in line {
                assert_eq!(c.len(), layout.dim(), "coordinate arity mismatch");
            }
        }
        Self { layout, coords }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}
