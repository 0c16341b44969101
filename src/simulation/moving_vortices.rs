//! Analytical solution of the moving vortices case
//!
//! A periodic array of vortices advected diagonally at unit speed. The domain
//! of the grid is mapped onto `[0, 2π] × [0, 2π]`, and with `X' = X - 2πt`,
//! `Y' = Y - 2πt`:
//!
//! ```text
//! u = 1 - 2 cos(X') sin(Y')
//! v = 1 + 2 sin(X') cos(Y')
//! p = -cos(2 X') - cos(2 Y')
//! ```
//!
//! Fields are sampled on the same staggered layout as the solver output, so they
//! can be restricted onto any grid nested in the one they were generated on.

use super::cuibm::CuIbmReader;
use crate::mesh::cell_widths;
use crate::prelude::*;
use crate::quantities;
use std::f64::consts::PI;

/// Moving vortices evaluated at a fixed time over a rectangular domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingVortices {
    bottom_left: [f64; 2],
    top_right: [f64; 2],
    time: f64,
}

impl MovingVortices {
    /// solution at `time` over the domain covered by `grid`
    pub fn new(grid: &Mesh, time: f64) -> Result<Self, Error> {
        let x = grid.bounds(Coordinate::X);
        let y = grid.bounds(Coordinate::Y);

        match (x, y) {
            (Some((x0, x1)), Some((y0, y1))) if x1 > x0 && y1 > y0 && grid.dim() == 2 => Ok(Self {
                bottom_left: [x0, y0],
                top_right: [x1, y1],
                time,
            }),
            _ => Err(GridMismatch::new(
                "moving vortices",
                format!("a {} grid does not span a 2D domain", grid.describe()),
            )
            .into()),
        }
    }

    /// position mapped onto `[0, 2π]²` and shifted by the advection
    fn phase(&self, x: f64, y: f64) -> (f64, f64) {
        let shift = 2.0 * PI * self.time;
        let map = |s: f64, d: usize| {
            2.0 * PI * (s - self.bottom_left[d]) / (self.top_right[d] - self.bottom_left[d])
        };

        (map(x, 0) - shift, map(y, 1) - shift)
    }

    pub fn x_velocity(&self, x: f64, y: f64) -> f64 {
        let (x, y) = self.phase(x, y);
        1.0 - 2.0 * x.cos() * y.sin()
    }

    pub fn y_velocity(&self, x: f64, y: f64) -> f64 {
        let (x, y) = self.phase(x, y);
        1.0 + 2.0 * x.sin() * y.cos()
    }

    pub fn pressure(&self, x: f64, y: f64) -> f64 {
        let (x, y) = self.phase(x, y);
        -(2.0 * x).cos() - (2.0 * y).cos()
    }

    /// Sample the fields `names` on the staggered layout of `grid`.
    ///
    /// Velocities live on the faces, pressure at the cell centres, fluxes are the
    /// velocities times the face widths, and the vorticity is computed from the
    /// staggered velocities the way it is for solver output.
    pub fn fields(
        &self,
        grid: &Mesh,
        names: &[FieldName],
        time_step: u32,
    ) -> Result<Vec<Field>, Error> {
        let u_mesh = grid.face_centered(Coordinate::X, false);
        let v_mesh = grid.face_centered(Coordinate::Y, false);

        let u = || {
            Field::from_fn_2d(u_mesh.clone(), time_step, FieldName::XVelocity.as_str(), |x, y| {
                self.x_velocity(x, y)
            })
        };
        let v = || {
            Field::from_fn_2d(v_mesh.clone(), time_step, FieldName::YVelocity.as_str(), |x, y| {
                self.y_velocity(x, y)
            })
        };

        names
            .iter()
            .map(|&name| match name {
                FieldName::XVelocity => u(),
                FieldName::YVelocity => v(),
                FieldName::Pressure => Field::from_fn_2d(
                    grid.cell_centered(),
                    time_step,
                    name.as_str(),
                    |x, y| self.pressure(x, y),
                ),
                FieldName::Vorticity => quantities::vorticity(&u()?, &v()?),
                FieldName::XFlux => scale_by_widths(&u()?, &grid.y_locations, Axis(0), name),
                FieldName::YFlux => scale_by_widths(&v()?, &grid.x_locations, Axis(1), name),
                FieldName::ZVelocity | FieldName::ZFlux => Err(ConfigError::new(format!(
                    "the moving vortices are two-dimensional and have no `{name}` field"
                ))
                .into()),
            })
            .collect()
    }
}

/// multiply each lane of `field` along `axis` by the width of its cell
fn scale_by_widths(
    field: &Field,
    stations: &[f64],
    axis: Axis,
    name: FieldName,
) -> Result<Field, Error> {
    let widths = cell_widths(stations);
    let mut values = field.values().clone();

    for (mut lane, width) in values.axis_iter_mut(axis).zip(&widths) {
        lane.mapv_inplace(|v| v * width);
    }

    Field::with_mask(
        field.mesh().clone(),
        values,
        field.defined().clone(),
        field.time_step(),
        name.as_str(),
    )
}

/// [`SolutionReader`] evaluating the moving vortices on the grid of a cuIBM directory
#[derive(Debug, Clone)]
pub struct MovingVorticesReader {
    grid_reader: CuIbmReader,
    time: f64,
}

impl MovingVorticesReader {
    pub fn new<P: Into<PathBuf>>(directory: P, time: f64) -> Self {
        Self {
            grid_reader: CuIbmReader::new(directory),
            time,
        }
    }
}

impl SolutionReader for MovingVorticesReader {
    fn read_grid(&self) -> Result<Mesh, Error> {
        self.grid_reader.read_grid()
    }

    /// the analytical solution exists at every step, so this lists the steps
    /// saved next to the grid
    fn time_steps(&self, range: Option<TimeStepRange>) -> Result<Vec<u32>, Error> {
        self.grid_reader.time_steps(range)
    }

    fn read_fields(&self, names: &[FieldName], time_step: u32) -> Result<Vec<Field>, Error> {
        let grid = self.read_grid()?;

        log::info!(
            "evaluating the moving vortices at time {} on a {} grid",
            self.time,
            grid.describe()
        );

        MovingVortices::new(&grid, self.time)?.fields(&grid, names, time_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid() -> Mesh {
        Mesh::uniform(&[-1.0, -1.0], &[1.0, 1.0], &[8, 8]).unwrap()
    }

    #[test]
    fn solution_is_periodic_in_time() {
        let grid = grid();
        let start = MovingVortices::new(&grid, 0.0).unwrap();
        let later = MovingVortices::new(&grid, 1.0).unwrap();

        for &(x, y) in &[(0.1, -0.3), (0.7, 0.2), (-0.9, 0.95)] {
            assert_abs_diff_eq!(start.x_velocity(x, y), later.x_velocity(x, y), epsilon = 1e-12);
            assert_abs_diff_eq!(start.pressure(x, y), later.pressure(x, y), epsilon = 1e-12);
        }
    }

    #[test]
    fn values_at_the_corner() {
        let solution = MovingVortices::new(&grid(), 0.0).unwrap();

        // X = Y = 0 at the bottom-left corner
        assert_abs_diff_eq!(solution.x_velocity(-1.0, -1.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(solution.y_velocity(-1.0, -1.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(solution.pressure(-1.0, -1.0), -2.0, epsilon = 1e-12);
        // X = π/2, Y = 0: u = 1, v = 3
        assert_abs_diff_eq!(solution.y_velocity(-0.5, -1.0), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn fields_on_the_staggered_layout() {
        let grid = grid();
        let solution = MovingVortices::new(&grid, 0.25).unwrap();
        let names = [
            FieldName::XVelocity,
            FieldName::YVelocity,
            FieldName::Pressure,
            FieldName::Vorticity,
        ];

        let fields = solution.fields(&grid, &names, 3).unwrap();

        assert_eq!(fields[0].shape(), &[8, 7]);
        assert_eq!(fields[1].shape(), &[7, 8]);
        assert_eq!(fields[2].shape(), &[8, 8]);
        assert_eq!(fields[3].shape(), &[7, 7]);
        assert!(fields.iter().all(|f| f.time_step() == 3));
        assert_eq!(fields[2].label(), "pressure");
    }

    #[test]
    fn fluxes_recover_the_velocity() {
        let grid = grid();
        let solution = MovingVortices::new(&grid, 0.1).unwrap();

        let names = [FieldName::XFlux, FieldName::YFlux];
        let fluxes = solution.fields(&grid, &names, 0).unwrap();
        let velocity = quantities::velocity_from_fluxes(&fluxes, &grid).unwrap();
        let exact = solution
            .fields(&grid, &[FieldName::XVelocity, FieldName::YVelocity], 0)
            .unwrap();

        for (computed, exact) in velocity.iter().zip(&exact) {
            for (a, b) in computed.iter().zip(exact.iter()) {
                assert_abs_diff_eq!(a.unwrap(), b.unwrap(), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn no_third_dimension() {
        let grid = grid();
        let solution = MovingVortices::new(&grid, 0.0).unwrap();

        assert!(matches!(
            solution.fields(&grid, &[FieldName::ZVelocity], 0),
            Err(Error::Config(_))
        ));
        assert!(MovingVortices::new(&Mesh::new(vec![0.0], vec![0.0, 1.0]), 0.0).is_err());
    }
}
