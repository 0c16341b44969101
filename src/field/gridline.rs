use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// distance under which a requested position is taken to be an existing gridline
pub const GRIDLINE_TOLERANCE: f64 = 1.0e-6;

/// orientation of a gridline through a 2D field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// line of constant `x`, sampled along `y`
    #[display(fmt = "vertical")]
    Vertical,
    /// line of constant `y`, sampled along `x`
    #[display(fmt = "horizontal")]
    Horizontal,
}

impl Direction {
    /// the coordinate held fixed along the line
    pub fn fixed(&self) -> Coordinate {
        match self {
            Direction::Vertical => Coordinate::X,
            Direction::Horizontal => Coordinate::Y,
        }
    }

    /// the coordinate varying along the line
    pub fn along(&self) -> Coordinate {
        match self {
            Direction::Vertical => Coordinate::Y,
            Direction::Horizontal => Coordinate::X,
        }
    }
}

/// Values of a field along one gridline
#[derive(Debug, Clone, PartialEq)]
pub struct Gridline {
    pub direction: Direction,
    /// position of the line along [`Direction::fixed`]
    pub position: f64,
    /// stations along [`Direction::along`]
    pub stations: Vec<f64>,
    /// `None` where the field is undefined
    pub values: Vec<Option<f64>>,
}

impl Gridline {
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl Field {
    /// Values of a 2D field along the line `direction` passing through `position`.
    ///
    /// A position within [`GRIDLINE_TOLERANCE`] of an existing gridline returns
    /// the sampled values; any other position inside the domain is linearly
    /// interpolated between the two bracketing gridlines.
    pub fn get_gridline_values(
        &self,
        direction: Direction,
        position: f64,
    ) -> Result<Gridline, Error> {
        let (values, defined) = self.view_2d()?;

        let fixed = direction.fixed();
        let fixed_stations = self.mesh().locations(fixed).unwrap_or_default();
        let along = self
            .mesh()
            .locations(direction.along())
            .unwrap_or_default()
            .to_vec();

        // the array axis running across the fixed coordinate
        let axis = Axis(fixed.array_axis(2));
        let line = |index: usize| -> Vec<Option<f64>> {
            values
                .index_axis(axis, index)
                .iter()
                .zip(defined.index_axis(axis, index).iter())
                .map(|(&v, &d)| if d { Some(v) } else { None })
                .collect()
        };

        let (first, last) = match (fixed_stations.first(), fixed_stations.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                let reason = format!("no stations along {fixed}");
                return Err(GridMismatch::new(self.label(), reason).into());
            }
        };

        if position < first - GRIDLINE_TOLERANCE || position > last + GRIDLINE_TOLERANCE {
            return Err(OutOfRange::new(self.label(), fixed, position, (first, last)).into());
        }

        // positions in the tolerance band outside the domain snap to the boundary line
        let exact = if position <= first {
            Some(0)
        } else if position >= last {
            Some(fixed_stations.len() - 1)
        } else {
            fixed_stations
                .iter()
                .position(|s| (s - position).abs() <= GRIDLINE_TOLERANCE)
        };

        if let Some(index) = exact {
            return Ok(Gridline {
                direction,
                position,
                stations: along,
                values: line(index),
            });
        }

        let out_of_range = || OutOfRange::new(self.label(), fixed, position, (first, last));
        let upper = fixed_stations
            .iter()
            .position(|&s| s > position)
            .ok_or_else(out_of_range)?;
        let lower = upper.checked_sub(1).ok_or_else(out_of_range)?;

        let (s_lower, s_upper) = (fixed_stations[lower], fixed_stations[upper]);
        let width = (s_upper - s_lower).abs();
        let w_lower = (s_upper - position).abs() / width;
        let w_upper = (s_lower - position).abs() / width;

        let interpolated = line(lower)
            .into_iter()
            .zip(line(upper))
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(w_lower * a + w_upper * b),
                _ => None,
            })
            .collect();

        Ok(Gridline {
            direction,
            position,
            stations: along,
            values: interpolated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{sampled, stations};
    use approx::assert_abs_diff_eq;

    fn linear() -> Field {
        let x = stations(0.0, 1.0, 4);
        let y = stations(0.0, 2.0, 4);
        sampled(&x, &y, "pressure", |x, y| 2.0 * x + 10.0 * y)
    }

    #[test]
    fn vertical_line_on_a_gridline() {
        let line = linear().get_gridline_values(Direction::Vertical, 0.5).unwrap();

        assert_eq!(line.stations, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        let values: Vec<f64> = line.values.into_iter().flatten().collect();
        assert_eq!(values, vec![1.0, 6.0, 11.0, 16.0, 21.0]);
    }

    #[test]
    fn horizontal_line_between_gridlines_is_interpolated() {
        let line = linear()
            .get_gridline_values(Direction::Horizontal, 0.2)
            .unwrap();

        // sampled along x
        assert_eq!(line.stations, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        for (x, value) in line.stations.iter().zip(line.values) {
            assert_abs_diff_eq!(value.unwrap(), 2.0 * x + 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn vertical_line_between_gridlines_is_interpolated() {
        let line = linear().get_gridline_values(Direction::Vertical, 0.9).unwrap();

        assert_eq!(line.len(), 5);
        for (y, value) in line.stations.iter().zip(line.values) {
            assert_abs_diff_eq!(value.unwrap(), 1.8 + 10.0 * y, epsilon = 1e-12);
        }
    }

    #[test]
    fn position_outside_the_domain() {
        let field = linear();

        assert!(matches!(
            field.get_gridline_values(Direction::Vertical, 1.5),
            Err(Error::OutOfRange(_))
        ));
        assert!(matches!(
            field.get_gridline_values(Direction::Horizontal, -0.1),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn position_just_below_the_first_gridline_snaps_to_it() {
        let mesh = Mesh::new(vec![0.0, 1.0], vec![0.0, 1.0]);
        let values = ndarray::arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        let field = Field::new(mesh, values, 0, "pressure").unwrap();

        let line = field
            .get_gridline_values(Direction::Vertical, -GRIDLINE_TOLERANCE)
            .unwrap();
        assert_eq!(line.values, vec![Some(1.0), Some(3.0)]);

        let shifted = Mesh::new(vec![1.0, 2.0], vec![0.0, 1.0]);
        let values = ndarray::arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        let field = Field::new(shifted, values, 0, "pressure").unwrap();

        let line = field
            .get_gridline_values(Direction::Vertical, 1.0 - GRIDLINE_TOLERANCE)
            .unwrap();
        assert_eq!(line.values, vec![Some(1.0), Some(3.0)]);
    }

    #[test]
    fn position_just_above_the_last_gridline_snaps_to_it() {
        let line = linear()
            .get_gridline_values(Direction::Horizontal, 2.0 + 0.5 * GRIDLINE_TOLERANCE)
            .unwrap();

        let values: Vec<f64> = line.values.into_iter().flatten().collect();
        assert_eq!(values, vec![20.0, 20.5, 21.0, 21.5, 22.0]);
    }

    #[test]
    fn undefined_neighbour_makes_interpolation_undefined() {
        let mesh = Mesh::new(vec![0.0, 1.0], vec![0.0, 1.0]);
        let values = ndarray::arr2(&[[1.0, 2.0], [f64::NAN, 4.0]]).into_dyn();
        let field = Field::new(mesh, values, 0, "pressure").unwrap();

        let line = field
            .get_gridline_values(Direction::Vertical, 0.5)
            .unwrap();
        assert_eq!(line.values, vec![Some(1.5), None]);
    }

    #[test]
    fn gridlines_need_a_2d_field() {
        let mesh = Mesh::new_3d(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]);
        let values = ndarray::ArrayD::zeros(IxDyn(&[2, 2, 2]));
        let field = Field::new(mesh, values, 0, "pressure").unwrap();

        assert!(matches!(
            field.get_gridline_values(Direction::Vertical, 0.5),
            Err(Error::GridMismatch(_))
        ));
    }
}
