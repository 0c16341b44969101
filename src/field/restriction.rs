use crate::prelude::*;

/// absolute tolerance under which two grid stations are the same node
pub const NODE_TOLERANCE: f64 = 1.0e-12;

impl Field {
    /// Restriction of the field onto a coarser, nested grid.
    ///
    /// Keeps the nodes whose station matches one of `grid`'s stations (within
    /// [`NODE_TOLERANCE`]) along every direction. The restricted field carries
    /// `grid`'s stations, the label, and the time-step of `self`.
    pub fn restriction(&self, grid: &Mesh) -> Result<Field, Error> {
        self.restriction_with_tolerance(grid, NODE_TOLERANCE)
    }

    /// [`Field::restriction`] with an explicit absolute tolerance.
    ///
    /// ## Errors
    ///
    /// * [`OutOfRange`] if a station of `grid` lies outside the stations of `self`
    /// * [`GridMismatch`] if the dimensions differ or some station of `grid` has no
    ///   (or more than one) matching station in `self`
    pub fn restriction_with_tolerance(&self, grid: &Mesh, tolerance: f64) -> Result<Field, Error> {
        if grid.dim() != self.dim() {
            return Err(GridMismatch::new(
                self.label(),
                format!(
                    "cannot restrict a {}D field onto a {}D grid",
                    self.dim(),
                    grid.dim()
                ),
            )
            .into());
        }

        let ndim = self.dim();
        let mut values = self.values().clone();
        let mut defined = self.defined().clone();
        let mut axes = Vec::with_capacity(ndim);

        for (coordinate, source) in self.mesh().axes() {
            let target = grid.locations(coordinate).unwrap_or_default();
            let indices = matching_indices(self.label(), coordinate, source, target, tolerance)?;

            let axis = Axis(coordinate.array_axis(ndim));
            values = values.select(axis, &indices);
            defined = defined.select(axis, &indices);

            axes.push((coordinate, target.to_vec()));
        }

        let mesh = Mesh::from_axes(self.label(), axes)?;

        Field::with_mask(mesh, values, defined, self.time_step(), self.label())
    }

    /// Subtract `other` from this field.
    ///
    /// Both fields must share the same stations (within [`NODE_TOLERANCE`]).
    /// The result keeps the stations and time-step of `self`, and is labelled
    /// `label` (default: the label of `self`).
    pub fn subtract(&self, other: &Field, label: Option<&str>) -> Result<Field, Error> {
        self.subtract_with_tolerance(other, label, NODE_TOLERANCE)
    }

    /// [`Field::subtract`] with an explicit absolute tolerance on the stations.
    pub fn subtract_with_tolerance(
        &self,
        other: &Field,
        label: Option<&str>,
        tolerance: f64,
    ) -> Result<Field, Error> {
        let label = label.unwrap_or(self.label()).to_string();

        if !self.mesh().approx_eq(other.mesh(), tolerance) {
            return Err(GridMismatch::new(
                label,
                format!(
                    "cannot subtract `{}` ({} nodes) from `{}` ({} nodes): stations differ",
                    other.label(),
                    other.mesh().describe(),
                    self.label(),
                    self.mesh().describe(),
                ),
            )
            .into());
        }

        self.zip_with(other, self.mesh().clone(), label, |a, b| Some(a - b))
    }
}

/// indices of `source` that match a station of `target`
fn matching_indices(
    label: &str,
    coordinate: Coordinate,
    source: &[f64],
    target: &[f64],
    tolerance: f64,
) -> Result<Vec<usize>, Error> {
    // stations of a validated mesh are never empty
    let (first, last) = match (source.first(), source.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(
                GridMismatch::new(label, format!("no stations along {coordinate}")).into(),
            )
        }
    };

    if let Some(&outside) = target
        .iter()
        .find(|&&t| t < first - tolerance || t > last + tolerance)
    {
        return Err(OutOfRange::new(label, coordinate, outside, (first, last)).into());
    }

    let indices: Vec<usize> = source
        .iter()
        .enumerate()
        .filter(|(_, s)| target.iter().any(|t| (*s - t).abs() <= tolerance))
        .map(|(index, _)| index)
        .collect();

    if indices.len() != target.len() {
        return Err(GridMismatch::new(
            label,
            format!(
                "restriction along {coordinate} matched {} node(s) for {} target station(s); \
                 the target grid is not nested in the field's grid",
                indices.len(),
                target.len()
            ),
        )
        .into());
    }

    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{sampled, stations};
    use ndarray::Array3;

    fn fine_field() -> Field {
        let x = stations(0.0, 1.0, 8);
        let y = stations(0.0, 2.0, 8);
        sampled(&x, &y, "pressure", |x, y| x * x + 3.0 * y)
    }

    fn coarse_grid() -> Mesh {
        Mesh::new(stations(0.0, 1.0, 4), stations(0.0, 2.0, 2))
    }

    #[test]
    fn restriction_keeps_nested_nodes() {
        let field = fine_field();
        let restricted = field.restriction(&coarse_grid()).unwrap();

        assert_eq!(restricted.shape(), &[3, 5]);
        assert_eq!(restricted.mesh(), &coarse_grid());
        assert_eq!(restricted.label(), "pressure");

        for (j, &y) in restricted.y().iter().enumerate() {
            for (i, &x) in restricted.x().iter().enumerate() {
                let expected = x * x + 3.0 * y;
                let actual = restricted.value(&[j, i]).unwrap();
                assert!((actual - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn restriction_is_idempotent() {
        let grid = coarse_grid();
        let once = fine_field().restriction(&grid).unwrap();
        let twice = once.restriction(&grid).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn restriction_onto_own_grid_is_identity() {
        let field = fine_field();
        let same = field.restriction(&field.mesh().clone()).unwrap();

        assert_eq!(same, field);
    }

    #[test]
    fn restriction_onto_non_nested_grid_fails() {
        let grid = Mesh::new(vec![0.0, 0.3, 1.0], stations(0.0, 2.0, 2));
        let err = fine_field().restriction(&grid).unwrap_err();

        assert!(matches!(err, Error::GridMismatch(_)));
    }

    #[test]
    fn restriction_outside_domain_fails() {
        let grid = Mesh::new(vec![0.0, 1.5], stations(0.0, 2.0, 2));
        let err = fine_field().restriction(&grid).unwrap_err();

        match err {
            Error::OutOfRange(e) => {
                assert_eq!(e.coordinate, Coordinate::X);
                assert_eq!(e.position, 1.5);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn restriction_needs_matching_dimension() {
        let grid = Mesh::new_3d(vec![0.0], vec![0.0], vec![0.0]);
        assert!(matches!(
            fine_field().restriction(&grid),
            Err(Error::GridMismatch(_))
        ));
    }

    #[test]
    fn restriction_in_three_dimensions() {
        let x = stations(0.0, 1.0, 4);
        let y = stations(0.0, 1.0, 2);
        let z = stations(0.0, 1.0, 4);
        let values = Array3::from_shape_fn((z.len(), y.len(), x.len()), |(k, j, i)| {
            (100 * k + 10 * j + i) as f64
        });
        let field = Field::from_3d(x, y, z, values, 3, "z-velocity").unwrap();

        let grid = Mesh::new_3d(
            stations(0.0, 1.0, 2),
            stations(0.0, 1.0, 1),
            stations(0.0, 1.0, 2),
        );
        let restricted = field.restriction(&grid).unwrap();

        assert_eq!(restricted.shape(), &[3, 2, 3]);
        assert_eq!(restricted.value(&[1, 1, 2]), Some(224.0));
        assert_eq!(restricted.time_step(), 3);
    }

    #[test]
    fn subtracting_a_field_from_itself_is_zero() {
        let field = fine_field();
        let difference = field.subtract(&field, Some("zero")).unwrap();

        assert_eq!(difference.label(), "zero");
        assert!(difference.iter().all(|v| v == Some(0.0)));
    }

    #[test]
    fn subtract_defaults_to_own_label() {
        let field = fine_field();
        let difference = field.subtract(&field, None).unwrap();
        assert_eq!(difference.label(), "pressure");
    }

    #[test]
    fn subtract_requires_same_grid() {
        let field = fine_field();
        let coarse = field.restriction(&coarse_grid()).unwrap();

        assert!(matches!(
            field.subtract(&coarse, None),
            Err(Error::GridMismatch(_))
        ));

        let x = stations(0.0, 1.0, 8);
        let shifted: Vec<f64> = stations(0.0, 2.0, 8).iter().map(|y| y + 1e-9).collect();
        let other = sampled(&x, &shifted, "pressure", |x, _| x);
        assert!(field.subtract(&other, None).is_err());
        assert!(field.subtract_with_tolerance(&other, None, 1e-6).is_ok());
    }

    #[test]
    fn subtract_propagates_undefined_nodes() {
        let mesh = Mesh::new(vec![0.0, 1.0], vec![0.0]);
        let values = ndarray::arr2(&[[1.0, f64::NAN]]).into_dyn();
        let a = Field::new(mesh.clone(), values, 0, "a").unwrap();
        let b = Field::new(mesh, ndarray::arr2(&[[0.5, 0.5]]).into_dyn(), 0, "b").unwrap();

        let difference = a.subtract(&b, None).unwrap();
        assert_eq!(difference.iter().collect::<Vec<_>>(), vec![Some(0.5), None]);
    }
}
