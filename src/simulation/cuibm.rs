//! Reader for the ASCII output of cuIBM
//!
//! A cuIBM simulation directory holds
//!
//! * `grid`: `nx`, the `nx + 1` stations along `x`, `ny`, then the `ny + 1`
//!   stations along `y`,
//! * `<time-step:07>/q`: the number of fluxes, then the `x` fluxes
//!   (`ny × (nx - 1)` values on `x[1:-1] × centres(y)`) followed by the `y` fluxes
//!   (`(ny - 1) × nx` values on `centres(x) × y[1:-1]`); along a periodic
//!   direction the last face `x[-1]` is stored as well and aliases `x[0]`,
//! * `<time-step:07>/lambda`: the number of unknowns, then the pressure at the
//!   `nx × ny` cell centres followed by the body forces.
//!
//! Velocities and vorticity are derived from the fluxes.

use crate::prelude::*;
use crate::quantities;
use ndarray::{Array2, Slice};

/// [`SolutionReader`] for cuIBM simulations written in ASCII
#[derive(Debug, Clone)]
pub struct CuIbmReader {
    directory: PathBuf,
    periodic: Vec<Coordinate>,
}

impl CuIbmReader {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            periodic: Vec::new(),
        }
    }

    /// directions with periodic boundary conditions
    pub fn with_periodic_directions(mut self, periodic: &[Coordinate]) -> Self {
        self.periodic = periodic.to_vec();
        self
    }

    fn is_periodic(&self, coordinate: Coordinate) -> bool {
        self.periodic.contains(&coordinate)
    }

    fn time_step_directory(&self, time_step: u32) -> PathBuf {
        self.directory.join(format!("{time_step:07}"))
    }

    /// Layout of the `coordinate` fluxes as stored on disk, with the array axis
    /// running along `coordinate` when that direction is periodic.
    fn stored_layout(&self, grid: &Mesh, coordinate: Coordinate) -> (Mesh, Option<Axis>) {
        let periodic = self.is_periodic(coordinate);
        let aliased = periodic.then(|| Axis(coordinate.array_axis(2)));

        (grid.face_centered(coordinate, periodic), aliased)
    }

    /// `x` and `y` flux components at `time_step`
    ///
    /// The aliased face stored along a periodic direction is dropped, so the
    /// fluxes always live on the interior faces.
    pub fn read_fluxes(&self, grid: &Mesh, time_step: u32) -> Result<Vec<Field>, Error> {
        let path = self.time_step_directory(time_step).join("q");
        let fluxes = read_counted(&path)?;

        let (x_stored, x_aliased) = self.stored_layout(grid, Coordinate::X);
        let (y_stored, y_aliased) = self.stored_layout(grid, Coordinate::Y);
        let (nx_size, ny_size) = (x_stored.num_nodes(), y_stored.num_nodes());

        if fluxes.len() != nx_size + ny_size {
            return Err(ParseOutput::new(
                &path,
                format!(
                    "expected {} fluxes on a {} grid, found {}",
                    nx_size + ny_size,
                    grid.describe(),
                    fluxes.len()
                ),
            )
            .into());
        }

        let qx = reshape(&path, &x_stored, fluxes[..nx_size].to_vec())?;
        let qy = reshape(&path, &y_stored, fluxes[nx_size..].to_vec())?;
        let qx = drop_aliased_face(qx, x_aliased);
        let qy = drop_aliased_face(qy, y_aliased);

        let x_mesh = grid.face_centered(Coordinate::X, false);
        let y_mesh = grid.face_centered(Coordinate::Y, false);

        Ok(vec![
            Field::new(x_mesh, qx.into_dyn(), time_step, FieldName::XFlux.as_str())?,
            Field::new(y_mesh, qy.into_dyn(), time_step, FieldName::YFlux.as_str())?,
        ])
    }

    /// pressure at the cell centres at `time_step`
    pub fn read_pressure(&self, grid: &Mesh, time_step: u32) -> Result<Field, Error> {
        let path = self.time_step_directory(time_step).join("lambda");
        let lambda = read_counted(&path)?;

        let mesh = grid.cell_centered();
        let size = mesh.num_nodes();

        if lambda.len() < size {
            return Err(ParseOutput::new(
                &path,
                format!(
                    "expected at least {} values on a {} grid, found {}",
                    size,
                    grid.describe(),
                    lambda.len()
                ),
            )
            .into());
        }

        let values = reshape(&path, &mesh, lambda[..size].to_vec())?;

        Field::new(mesh, values.into_dyn(), time_step, FieldName::Pressure.as_str())
    }
}

/// Sorted time steps of the `0…` folders saved in `directory`
pub fn saved_time_steps(directory: &Path) -> Result<Vec<u32>, Error> {
    let mut steps = Vec::new();

    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let name = entry.file_name();
        match name.to_str() {
            Some(name) if name.starts_with('0') => match name.parse::<u32>() {
                Ok(step) => steps.push(step),
                Err(_) => log::debug!("skipping folder `{name}`: not a time step"),
            },
            _ => {}
        }
    }

    steps.sort_unstable();
    Ok(steps)
}

impl SolutionReader for CuIbmReader {
    fn read_grid(&self) -> Result<Mesh, Error> {
        let path = self.directory.join("grid");
        let data = read_numbers(&path)?;

        let (x, rest) = split_stations(&path, &data, Coordinate::X)?;
        let (y, rest) = split_stations(&path, rest, Coordinate::Y)?;

        if !rest.is_empty() {
            return Err(ParseOutput::new(
                &path,
                format!("{} trailing value(s) after the y stations", rest.len()),
            )
            .into());
        }

        let grid = Mesh::new(x, y);
        grid.validate("grid")?;

        Ok(grid)
    }

    fn time_steps(&self, range: Option<TimeStepRange>) -> Result<Vec<u32>, Error> {
        match range {
            Some(range) => range.steps(),
            None => saved_time_steps(&self.directory),
        }
    }

    fn read_fields(&self, names: &[FieldName], time_step: u32) -> Result<Vec<Field>, Error> {
        let grid = self.read_grid()?;

        let mut fluxes: Option<Vec<Field>> = None;
        let mut velocity: Option<Vec<Field>> = None;
        let mut fields = Vec::with_capacity(names.len());

        for &name in names {
            let field = match name {
                FieldName::Pressure => self.read_pressure(&grid, time_step)?,
                FieldName::ZVelocity | FieldName::ZFlux => {
                    return Err(ConfigError::new(format!(
                        "cuIBM simulations are two-dimensional and have no `{name}` field"
                    ))
                    .into())
                }
                _ => {
                    if fluxes.is_none() {
                        fluxes = Some(self.read_fluxes(&grid, time_step)?);
                    }
                    let q = fluxes.as_deref().unwrap_or_default();

                    let needs_velocity = matches!(
                        name,
                        FieldName::XVelocity | FieldName::YVelocity | FieldName::Vorticity
                    );
                    if needs_velocity && velocity.is_none() {
                        velocity = Some(quantities::velocity_from_fluxes(q, &grid)?);
                    }
                    let uv = velocity.as_deref().unwrap_or_default();

                    match (name, q, uv) {
                        (FieldName::XFlux, [qx, _], _) => qx.clone(),
                        (FieldName::YFlux, [_, qy], _) => qy.clone(),
                        (FieldName::XVelocity, _, [u, _]) => u.clone(),
                        (FieldName::YVelocity, _, [_, v]) => v.clone(),
                        (FieldName::Vorticity, _, [u, v]) => quantities::vorticity(u, v)?,
                        _ => {
                            return Err(ParseOutput::new(
                                &self.directory,
                                format!("could not derive `{name}` from the fluxes"),
                            )
                            .into())
                        }
                    }
                }
            };

            fields.push(field);
        }

        Ok(fields)
    }
}

/// remove the last lane along `axis`, when given
fn drop_aliased_face(values: Array2<f64>, axis: Option<Axis>) -> Array2<f64> {
    match axis {
        Some(axis) => values.slice_axis(axis, Slice::new(0, Some(-1), 1)).to_owned(),
        None => values,
    }
}

/// split `n` followed by `n + 1` stations off the front of `data`
fn split_stations<'a>(
    path: &Path,
    data: &'a [f64],
    coordinate: Coordinate,
) -> Result<(Vec<f64>, &'a [f64]), Error> {
    let (&count, rest) = data.split_first().ok_or_else(|| {
        ParseOutput::new(path, format!("missing number of cells along {coordinate}"))
    })?;

    let n_cells = parse_count(path, count)?;

    if rest.len() < n_cells + 1 {
        return Err(ParseOutput::new(
            path,
            format!(
                "expected {} stations along {coordinate}, found {}",
                n_cells + 1,
                rest.len()
            ),
        )
        .into());
    }

    let (stations, rest) = rest.split_at(n_cells + 1);
    Ok((stations.to_vec(), rest))
}

fn parse_count(path: &Path, value: f64) -> Result<usize, Error> {
    if value.fract() != 0.0 || value < 0.0 {
        return Err(ParseOutput::new(path, format!("`{value}` is not a count")).into());
    }

    Ok(value as usize)
}

fn reshape(path: &Path, mesh: &Mesh, values: Vec<f64>) -> Result<Array2<f64>, Error> {
    let shape = (mesh.y_locations.len(), mesh.x_locations.len());

    Array2::from_shape_vec(shape, values)
        .map_err(|e| ParseOutput::new(path, format!("cannot reshape to {shape:?}: {e}")).into())
}

/// a count on the first line, then exactly that many values
fn read_counted(path: &Path) -> Result<Vec<f64>, Error> {
    let data = read_numbers(path)?;

    let (&count, values) = data
        .split_first()
        .ok_or_else(|| ParseOutput::new(path, "empty file"))?;
    let count = parse_count(path, count)?;

    if values.len() != count {
        return Err(ParseOutput::new(
            path,
            format!("header announces {} values, found {}", count, values.len()),
        )
        .into());
    }

    Ok(values.to_vec())
}

/// every whitespace separated number of an ASCII file
fn read_numbers(path: &Path) -> Result<Vec<f64>, Error> {
    let bytes = std::fs::read(path)?;

    if is_binary(&bytes) {
        return Err(ParseOutput::new(
            path,
            "binary cuIBM output is not supported, write the solution in ASCII",
        )
        .into());
    }

    let text = String::from_utf8_lossy(&bytes);

    text.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| ParseOutput::new(path, format!("`{token}` is not a number")).into())
        })
        .collect()
}

/// `true` when the first kilobyte holds bytes that do not appear in text files
fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(1024).any(|&b| {
        let text = matches!(b, 7..=10 | 12 | 13 | 27) || (b >= 0x20 && b != 0x7f);
        !text
    })
}
