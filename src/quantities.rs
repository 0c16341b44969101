//! Derived quantities of a staggered velocity field
//!
//! Immersed-boundary solvers store the flux through each cell face. The
//! functions here turn fluxes into velocities, compute the vorticity of a 2D
//! flow, and average the staggered velocity components onto cell centres.

use crate::mesh::{cell_centers, cell_widths, interior_stations};
use crate::prelude::*;
use ndarray::{Array2, Dimension};

const COORDINATES: [Coordinate; 3] = [Coordinate::X, Coordinate::Y, Coordinate::Z];

/// Velocity components from the face fluxes of a staggered grid.
///
/// `fluxes` holds the `x`, `y` (and `z`) flux components in that order and
/// `grid` the cell vertices. Each flux is divided by the widths of the cells
/// along the other directions: `u = qx / dy` in 2D, `u = qx / (dy dz)` in 3D.
pub fn velocity_from_fluxes(fluxes: &[Field], grid: &Mesh) -> Result<Vec<Field>, Error> {
    if fluxes.len() != grid.dim() {
        return Err(GridMismatch::new(
            "velocity",
            format!(
                "{} flux component(s) for a {}D grid",
                fluxes.len(),
                grid.dim()
            ),
        )
        .into());
    }

    fluxes
        .iter()
        .zip(COORDINATES)
        .map(|(flux, coordinate)| velocity_from_flux(flux, coordinate, grid))
        .collect()
}

fn velocity_from_flux(flux: &Field, coordinate: Coordinate, grid: &Mesh) -> Result<Field, Error> {
    let label = FieldName::velocity(coordinate).as_str();
    let ndim = flux.dim();

    if ndim != grid.dim() {
        return Err(GridMismatch::new(
            label,
            format!("{}D flux on a {}D grid", ndim, grid.dim()),
        )
        .into());
    }

    let mut values = flux.values().clone();

    for (other, stations) in grid.axes().filter(|(c, _)| *c != coordinate) {
        let widths = cell_widths(stations);
        let axis = Axis(other.array_axis(ndim));

        if values.len_of(axis) != widths.len() {
            return Err(GridMismatch::new(
                label,
                format!(
                    "flux `{}` has {} node(s) along {other} but the grid has {} cell(s)",
                    flux.label(),
                    values.len_of(axis),
                    widths.len()
                ),
            )
            .into());
        }

        for (mut lane, width) in values.axis_iter_mut(axis).zip(&widths) {
            lane.mapv_inplace(|v| v / width);
        }
    }

    Field::with_mask(
        flux.mesh().clone(),
        values,
        flux.defined().clone(),
        flux.time_step(),
        label,
    )
}

/// Vorticity `dv/dx - du/dy` of a 2D staggered velocity field.
///
/// The vorticity lives at the cell vertices between the `u` and `v` nodes:
/// `x = centres(v.x)` and `y = centres(u.y)`. Only the `u` columns strictly inside
/// `v.x` and the `v` rows strictly inside `u.y` take part, which handles both
/// periodic and wall-bounded layouts.
pub fn vorticity(u: &Field, v: &Field) -> Result<Field, Error> {
    let label = FieldName::Vorticity.as_str();

    let (u_values, u_defined) = u.view_2d()?;
    let (v_values, v_defined) = v.view_2d()?;

    let strictly_inside = |stations: &[f64], bounds: &[f64]| -> Vec<usize> {
        match (bounds.first(), bounds.last()) {
            (Some(&low), Some(&high)) => stations
                .iter()
                .enumerate()
                .filter(|(_, s)| **s > low && **s < high)
                .map(|(index, _)| index)
                .collect(),
            _ => Vec::new(),
        }
    };

    let mask_x = strictly_inside(u.x(), v.x());
    let mask_y = strictly_inside(v.y(), u.y());

    let xw = cell_centers(v.x());
    let yw = cell_centers(u.y());

    if mask_x.len() != xw.len() || mask_y.len() != yw.len() {
        return Err(GridMismatch::new(
            label,
            format!(
                "velocity components on {} and {} nodes are not staggered around common vertices",
                u.mesh().describe(),
                v.mesh().describe()
            ),
        )
        .into());
    }

    let u_values = u_values.select(Axis(1), &mask_x);
    let u_defined = u_defined.select(Axis(1), &mask_x);
    let v_values = v_values.select(Axis(0), &mask_y);
    let v_defined = v_defined.select(Axis(0), &mask_y);

    let dx = cell_widths(v.x());
    let dy = cell_widths(u.y());

    let values = Array2::from_shape_fn((yw.len(), xw.len()), |(j, i)| {
        let defined = v_defined[[j, i]]
            && v_defined[[j, i + 1]]
            && u_defined[[j, i]]
            && u_defined[[j + 1, i]];

        if defined {
            let dv_dx = (v_values[[j, i + 1]] - v_values[[j, i]]) / dx[i];
            let du_dy = (u_values[[j + 1, i]] - u_values[[j, i]]) / dy[j];
            Some(dv_dx - du_dy)
        } else {
            None
        }
    });

    Field::from_options(Mesh::new(xw, yw), values.into_dyn(), u.time_step(), label)
}

/// Average the staggered velocity components `[u, v]` or `[u, v, w]` onto the
/// interior cell centres.
///
/// The centres are `x = v.x[1:-1]`, `y = u.y[1:-1]` (and `z = u.z[1:-1]`). Each
/// component is averaged between the two faces bracketing a centre along its
/// own direction.
pub fn velocity_cell_centers(components: &[Field]) -> Result<Vec<Field>, Error> {
    let ndim = components.len();

    if !(ndim == 2 || ndim == 3) || components.iter().any(|c| c.dim() != ndim) {
        return Err(GridMismatch::new(
            "velocity",
            format!(
                "expected 2 or 3 velocity components of matching dimension, got {}",
                components.len()
            ),
        )
        .into());
    }

    // the stations of a component are cell centres along every other direction
    let u = &components[0];
    let v = &components[1];
    let mut centers = vec![
        (Coordinate::X, interior_stations(v.x(), false)),
        (Coordinate::Y, interior_stations(u.y(), false)),
    ];
    if let Some(z) = u.z() {
        centers.push((Coordinate::Z, interior_stations(z, false)));
    }

    let mesh = Mesh::from_axes("velocity", centers)?;
    mesh.validate("velocity")?;
    let shape = mesh.shape();

    components
        .iter()
        .zip(COORDINATES)
        .map(|(component, coordinate)| {
            let along = coordinate.array_axis(ndim);

            // shift by one along every direction but `along`, where the two faces
            // are `i` and `i + 1`
            let mut first = vec![1; ndim];
            first[along] = 0;
            let second = vec![1; ndim];

            let expected: Vec<usize> = (0..ndim).map(|d| shape[d] + first[d] + second[d]).collect();

            if component.shape() != expected.as_slice() {
                return Err(GridMismatch::new(
                    component.label(),
                    format!(
                        "component has shape {:?}, expected {:?} around {} cell centres",
                        component.shape(),
                        expected,
                        mesh.describe()
                    ),
                )
                .into());
            }

            let values = ArrayD::from_shape_fn(IxDyn(&shape), |index| {
                let shifted = |offset: &[usize]| -> Vec<usize> {
                    index.slice().iter().zip(offset).map(|(i, o)| i + o).collect()
                };
                let a = component.value(&shifted(&first))?;
                let b = component.value(&shifted(&second))?;
                Some(0.5 * (a + b))
            });

            Field::from_options(
                mesh.clone(),
                values,
                component.time_step(),
                FieldName::velocity(coordinate).as_str(),
            )
        })
        .collect()
}
