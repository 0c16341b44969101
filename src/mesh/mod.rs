//! # Mesh Information
//!
//! A [`Mesh`] holds the node stations of a rectilinear grid along each direction.
//! Two-dimensional meshes have `x` and `y` stations, three-dimensional meshes
//! carry an extra set of `z` stations.
//!
//! Fields sampled on a mesh store their values row-major with `x` varying the
//! fastest: a 2D field has shape `(ny, nx)` and a 3D field has shape
//! `(nz, ny, nx)`. [`Coordinate::array_axis`] converts between the two
//! orderings.
//!
//! ## Staggered layouts
//!
//! Immersed-boundary solvers store pressure at cell centres and the flux / velocity
//! components on the faces normal to their own direction. The helpers in this module
//! ([`Mesh::cell_centered`], [`Mesh::face_centered`]) build the mesh of each of
//! these layouts from the mesh of cell vertices.

mod staggered;

pub use staggered::{cell_centers, cell_widths, interior_stations};

use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// direction of a grid axis
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Coordinate {
    #[display(fmt = "x")]
    X,
    #[display(fmt = "y")]
    Y,
    #[display(fmt = "z")]
    Z,
}

impl Coordinate {
    /// index of the array axis holding this coordinate for a field with `ndim` dimensions
    ///
    /// `ndim` must be 2 or 3, and [`Coordinate::Z`] is only valid for `ndim == 3`.
    pub fn array_axis(&self, ndim: usize) -> usize {
        match self {
            Self::X => ndim - 1,
            Self::Y => ndim - 2,
            Self::Z => ndim - 3,
        }
    }
}

/// Node stations of a rectilinear grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub x_locations: Vec<f64>,
    pub y_locations: Vec<f64>,
    pub z_locations: Option<Vec<f64>>,
}

impl Mesh {
    /// Constructor for a 2D mesh
    pub fn new(x_locations: Vec<f64>, y_locations: Vec<f64>) -> Self {
        Self {
            x_locations,
            y_locations,
            z_locations: None,
        }
    }

    /// Constructor for a 3D mesh
    pub fn new_3d(x_locations: Vec<f64>, y_locations: Vec<f64>, z_locations: Vec<f64>) -> Self {
        Self {
            x_locations,
            y_locations,
            z_locations: Some(z_locations),
        }
    }

    /// Uniform Cartesian grid with `n_cells[i] + 1` equally spaced stations
    /// between `bottom_left[i]` and `top_right[i]`.
    pub fn uniform(
        bottom_left: &[f64],
        top_right: &[f64],
        n_cells: &[usize],
    ) -> Result<Self, Error> {
        let dim = n_cells.len();

        if bottom_left.len() != dim || top_right.len() != dim || !(dim == 2 || dim == 3) {
            return Err(GridMismatch::new(
                "uniform grid",
                format!(
                    "corners have {} and {} components for {} cell counts (expected 2 or 3 of each)",
                    bottom_left.len(),
                    top_right.len(),
                    dim
                ),
            )
            .into());
        }

        let mut axes = Vec::with_capacity(dim);

        for ((&start, &end), &n) in bottom_left.iter().zip(top_right).zip(n_cells) {
            if n == 0 || end <= start {
                return Err(GridMismatch::new(
                    "uniform grid",
                    format!("cannot split [{start}, {end}] into {n} cells"),
                )
                .into());
            }

            let h = (end - start) / n as f64;
            let mut stations: Vec<f64> = (0..=n).map(|i| start + h * i as f64).collect();
            // pin the last station so it does not drift from the requested corner
            stations[n] = end;
            axes.push(stations);
        }

        let mut axes = axes.into_iter();
        let x = axes.next().unwrap_or_default();
        let y = axes.next().unwrap_or_default();

        let mesh = match axes.next() {
            Some(z) => Mesh::new_3d(x, y, z),
            None => Mesh::new(x, y),
        };

        log::info!(
            "created a uniform Cartesian grid with {:?} cells",
            n_cells
        );

        Ok(mesh)
    }

    /// number of spatial dimensions (2 or 3)
    pub fn dim(&self) -> usize {
        if self.z_locations.is_some() {
            3
        } else {
            2
        }
    }

    /// stations along `coordinate`, if the mesh has that direction
    pub fn locations(&self, coordinate: Coordinate) -> Option<&[f64]> {
        match coordinate {
            Coordinate::X => Some(&self.x_locations),
            Coordinate::Y => Some(&self.y_locations),
            Coordinate::Z => self.z_locations.as_deref(),
        }
    }

    /// iterate over the directions of this mesh and their stations, `x` first
    pub fn axes(&self) -> impl Iterator<Item = (Coordinate, &[f64])> + '_ {
        [Coordinate::X, Coordinate::Y, Coordinate::Z]
            .into_iter()
            .filter_map(move |c| self.locations(c).map(|stations| (c, stations)))
    }

    /// shape of an array sampled on this mesh, in array-axis order
    pub fn shape(&self) -> Vec<usize> {
        let mut shape: Vec<usize> = self.axes().map(|(_, stations)| stations.len()).collect();
        shape.reverse();
        shape
    }

    /// total number of nodes
    pub fn num_nodes(&self) -> usize {
        self.shape().iter().product()
    }

    /// first and last station along `coordinate`
    pub fn bounds(&self, coordinate: Coordinate) -> Option<(f64, f64)> {
        let stations = self.locations(coordinate)?;
        Some((*stations.first()?, *stations.last()?))
    }

    /// Grid spacing of a uniform grid, measured along `x`:
    /// `(x_max - x_min) / n_cells`
    pub fn grid_spacing(&self) -> Result<f64, Error> {
        match self.x_locations.as_slice() {
            [first, .., last] => Ok((last - first) / (self.x_locations.len() - 1) as f64),
            _ => Err(GridMismatch::new(
                "grid spacing",
                format!(
                    "a spacing needs at least two x stations, mesh has {}",
                    self.x_locations.len()
                ),
            )
            .into()),
        }
    }

    /// build a mesh from `(coordinate, stations)` pairs
    pub(crate) fn from_axes(label: &str, axes: Vec<(Coordinate, Vec<f64>)>) -> Result<Self, Error> {
        let mut mesh = Mesh::default();
        let mut seen = Vec::new();

        for (coordinate, stations) in axes {
            match coordinate {
                Coordinate::X => mesh.x_locations = stations,
                Coordinate::Y => mesh.y_locations = stations,
                Coordinate::Z => mesh.z_locations = Some(stations),
            }
            seen.push(coordinate);
        }

        if !(seen.contains(&Coordinate::X) && seen.contains(&Coordinate::Y)) {
            return Err(GridMismatch::new(label, "a mesh needs both x and y stations").into());
        }

        Ok(mesh)
    }

    /// replace the stations along one direction
    pub fn with_locations(mut self, coordinate: Coordinate, stations: Vec<f64>) -> Self {
        match coordinate {
            Coordinate::X => self.x_locations = stations,
            Coordinate::Y => self.y_locations = stations,
            Coordinate::Z => self.z_locations = Some(stations),
        }
        self
    }

    /// Check the mesh invariant: every direction has at least one finite station
    /// and stations are strictly increasing.
    pub fn validate(&self, label: &str) -> Result<(), Error> {
        for (coordinate, stations) in self.axes() {
            if stations.is_empty() {
                return Err(
                    GridMismatch::new(label, format!("no stations along {coordinate}")).into(),
                );
            }

            if stations.iter().any(|s| !s.is_finite()) {
                return Err(GridMismatch::new(
                    label,
                    format!("non-finite station along {coordinate}"),
                )
                .into());
            }

            if let Some(index) = stations.windows(2).position(|w| w[1] <= w[0]) {
                return Err(GridMismatch::new(
                    label,
                    format!(
                        "stations along {coordinate} are not strictly increasing at index {}",
                        index + 1
                    ),
                )
                .into());
            }
        }

        Ok(())
    }

    /// `true` when both meshes have the same dimension, the same number of stations,
    /// and every station pair is within `tolerance`
    pub fn approx_eq(&self, other: &Mesh, tolerance: f64) -> bool {
        self.dim() == other.dim()
            && self.axes().zip(other.axes()).all(|((_, a), (_, b))| {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| (a - b).abs() <= tolerance)
            })
    }

    /// short human-readable description such as `"40x40"`
    pub fn describe(&self) -> String {
        self.axes()
            .map(|(_, stations)| stations.len().to_string())
            .collect::<Vec<_>>()
            .join("x")
    }
}
