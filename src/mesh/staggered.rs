use super::{Coordinate, Mesh};

/// midpoints between consecutive stations
pub fn cell_centers(stations: &[f64]) -> Vec<f64> {
    stations.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
}

/// distance between consecutive stations
pub fn cell_widths(stations: &[f64]) -> Vec<f64> {
    stations.windows(2).map(|w| w[1] - w[0]).collect()
}

/// stations of the faces a solver stores along this direction
///
/// Without periodicity the two boundary faces are not solved for (`x[1:-1]`).
/// With periodicity the last face aliases the first one and is stored (`x[1:]`).
pub fn interior_stations(stations: &[f64], periodic: bool) -> Vec<f64> {
    let n = stations.len();

    if periodic {
        stations.iter().skip(1).copied().collect()
    } else if n > 2 {
        stations[1..n - 1].to_vec()
    } else {
        Vec::new()
    }
}

impl Mesh {
    /// the mesh of cell centres of this (vertex) mesh
    pub fn cell_centered(&self) -> Mesh {
        let mut mesh = Mesh::new(
            cell_centers(&self.x_locations),
            cell_centers(&self.y_locations),
        );
        mesh.z_locations = self.z_locations.as_deref().map(cell_centers);
        mesh
    }

    /// The mesh holding the `coordinate` component of a staggered vector field:
    /// the stored faces along `coordinate` (see [`interior_stations`]), cell
    /// centres along every other direction.
    pub fn face_centered(&self, coordinate: Coordinate, periodic: bool) -> Mesh {
        let mut mesh = self.cell_centered();

        if let Some(stations) = self.locations(coordinate) {
            mesh = mesh.with_locations(coordinate, interior_stations(stations, periodic));
        }

        mesh
    }
}
