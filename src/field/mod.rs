//! Scalar fields sampled on rectilinear grids
//!
//! A [`Field`] bundles a [`Mesh`], a dense array of values, and a mask of the
//! nodes where the value is defined. Nodes become undefined when a computation
//! cannot produce a meaningful value there (for example a relative difference
//! with a near-zero denominator). Every combinator propagates undefined nodes,
//! and every reduction (norms, extrema) either skips them explicitly or refuses
//! to run; they are never silently turned into `NaN`.
//!
//! Fields are values: every combinator returns a new `Field` and the only
//! in-place changes allowed are to the label and the time-step tag.

mod gridline;
mod norm;
mod restriction;

pub use gridline::{Direction, Gridline, GRIDLINE_TOLERANCE};
pub use norm::Norm;
pub use restriction::NODE_TOLERANCE;

use crate::prelude::*;
use ndarray::{Array2, Array3};

#[derive(Debug, Clone)]
pub struct Field {
    mesh: Mesh,
    values: ArrayD<f64>,
    defined: ArrayD<bool>,
    time_step: u32,
    label: String,
}

impl Field {
    /// Construct a field from a mesh and values in array-axis order
    /// (`(ny, nx)` or `(nz, ny, nx)`).
    ///
    /// Non-finite input values (legacy `NaN` markers) become undefined nodes.
    pub fn new<T: Into<String>>(
        mesh: Mesh,
        values: ArrayD<f64>,
        time_step: u32,
        label: T,
    ) -> Result<Self, Error> {
        let defined = values.mapv(f64::is_finite);
        Self::with_mask(mesh, values, defined, time_step, label)
    }

    /// Construct a field with an explicit mask of defined nodes
    pub fn with_mask<T: Into<String>>(
        mesh: Mesh,
        values: ArrayD<f64>,
        defined: ArrayD<bool>,
        time_step: u32,
        label: T,
    ) -> Result<Self, Error> {
        let label = label.into();
        mesh.validate(&label)?;

        let expected = mesh.shape();

        if values.shape() != expected.as_slice() {
            return Err(GridMismatch::new(
                label,
                format!(
                    "values have shape {:?} but the {} mesh needs {:?}",
                    values.shape(),
                    mesh.describe(),
                    expected
                ),
            )
            .into());
        }

        if defined.shape() != values.shape() {
            return Err(GridMismatch::new(
                label,
                format!(
                    "mask shape {:?} differs from value shape {:?}",
                    defined.shape(),
                    values.shape()
                ),
            )
            .into());
        }

        // undefined slots hold zero so that equal fields compare equal
        let values = Zip::from(&values)
            .and(&defined)
            .map_collect(|&v, &d| if d { v } else { 0.0 });

        Ok(Self {
            mesh,
            values,
            defined,
            time_step,
            label,
        })
    }

    /// Construct a 2D field from its stations and a `(ny, nx)` array
    pub fn from_2d<T: Into<String>>(
        x: Vec<f64>,
        y: Vec<f64>,
        values: Array2<f64>,
        time_step: u32,
        label: T,
    ) -> Result<Self, Error> {
        Self::new(Mesh::new(x, y), values.into_dyn(), time_step, label)
    }

    /// Construct a 3D field from its stations and a `(nz, ny, nx)` array
    pub fn from_3d<T: Into<String>>(
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
        values: Array3<f64>,
        time_step: u32,
        label: T,
    ) -> Result<Self, Error> {
        Self::new(Mesh::new_3d(x, y, z), values.into_dyn(), time_step, label)
    }

    /// Construct a field from optional values, `None` marking undefined nodes
    pub fn from_options<T: Into<String>>(
        mesh: Mesh,
        values: ArrayD<Option<f64>>,
        time_step: u32,
        label: T,
    ) -> Result<Self, Error> {
        let defined = values.mapv(|v| v.is_some());
        let values = values.mapv(|v| v.unwrap_or(0.0));
        Self::with_mask(mesh, values, defined, time_step, label)
    }

    /// Sample `f(x, y)` on every node of a 2D mesh
    pub fn from_fn_2d<T, F>(mesh: Mesh, time_step: u32, label: T, f: F) -> Result<Self, Error>
    where
        T: Into<String>,
        F: Fn(f64, f64) -> f64,
    {
        let shape = (mesh.y_locations.len(), mesh.x_locations.len());
        let values =
            Array2::from_shape_fn(shape, |(j, i)| f(mesh.x_locations[i], mesh.y_locations[j]));
        Self::new(mesh, values.into_dyn(), time_step, label)
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn x(&self) -> &[f64] {
        &self.mesh.x_locations
    }

    pub fn y(&self) -> &[f64] {
        &self.mesh.y_locations
    }

    pub fn z(&self) -> Option<&[f64]> {
        self.mesh.z_locations.as_deref()
    }

    /// Raw values. Entries at undefined nodes hold `0.0` and carry no meaning;
    /// check [`Field::defined`] or use [`Field::iter`].
    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// mask of defined nodes
    pub fn defined(&self) -> &ArrayD<bool> {
        &self.defined
    }

    pub fn time_step(&self) -> u32 {
        self.time_step
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn dim(&self) -> usize {
        self.values.ndim()
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// value at an array index, `None` if undefined or out of bounds
    pub fn value(&self, index: &[usize]) -> Option<f64> {
        match self.defined.get(index) {
            Some(&true) => self.values.get(index).copied(),
            _ => None,
        }
    }

    /// every node in row-major order (`x` fastest), `None` where undefined
    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values
            .iter()
            .zip(self.defined.iter())
            .map(|(&v, &d)| if d { Some(v) } else { None })
    }

    /// number of undefined nodes
    pub fn count_undefined(&self) -> usize {
        self.defined.iter().filter(|d| !**d).count()
    }

    pub fn is_fully_defined(&self) -> bool {
        self.defined.iter().all(|d| *d)
    }

    /// smallest defined value
    pub fn min(&self) -> Option<f64> {
        self.iter().flatten().reduce(f64::min)
    }

    /// largest defined value
    pub fn max(&self) -> Option<f64> {
        self.iter().flatten().reduce(f64::max)
    }

    /// change the label in place
    pub fn relabel<T: Into<String>>(&mut self, label: T) {
        self.label = label.into();
    }

    /// change the time-step tag in place
    pub fn set_time_step(&mut self, time_step: u32) {
        self.time_step = time_step;
    }

    pub fn with_label<T: Into<String>>(mut self, label: T) -> Self {
        self.relabel(label);
        self
    }

    pub fn with_time_step(mut self, time_step: u32) -> Self {
        self.set_time_step(time_step);
        self
    }

    /// 2D views of the values and mask
    pub(crate) fn view_2d(&self) -> Result<(ArrayView2<'_, f64>, ArrayView2<'_, bool>), Error> {
        let values = self.values.view().into_dimensionality::<Ix2>();
        let defined = self.defined.view().into_dimensionality::<Ix2>();

        match (values, defined) {
            (Ok(values), Ok(defined)) => Ok((values, defined)),
            _ => Err(GridMismatch::new(
                self.label.clone(),
                format!("expected a 2D field, got {} dimensions", self.dim()),
            )
            .into()),
        }
    }

    /// Combine two fields of identical shape node by node.
    ///
    /// `op` only runs where both inputs are defined; returning `None` marks
    /// the node undefined. The caller is responsible for checking that the
    /// meshes agree.
    pub(crate) fn zip_with<F>(
        &self,
        other: &Field,
        mesh: Mesh,
        label: String,
        op: F,
    ) -> Result<Field, Error>
    where
        F: Fn(f64, f64) -> Option<f64>,
    {
        if self.shape() != other.shape() {
            return Err(GridMismatch::new(
                label,
                format!(
                    "cannot combine shapes {:?} and {:?}",
                    self.shape(),
                    other.shape()
                ),
            )
            .into());
        }

        let values = Zip::from(&self.values)
            .and(&self.defined)
            .and(&other.values)
            .and(&other.defined)
            .map_collect(|&a, &da, &b, &db| if da && db { op(a, b) } else { None });

        Field::from_options(mesh, values, self.time_step, label)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.time_step == other.time_step
            && self.mesh == other.mesh
            && self.defined == other.defined
            && self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{sampled, stations};

    #[test]
    fn shape_must_match_mesh() {
        let mesh = Mesh::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0]);
        let values = ArrayD::zeros(IxDyn(&[3, 2]));

        let err = Field::new(mesh, values, 0, "pressure").unwrap_err();
        assert!(matches!(err, Error::GridMismatch(_)));
    }

    #[test]
    fn non_finite_inputs_are_undefined() {
        let values =
            Array2::from_shape_vec((2, 2), vec![1.0, f64::NAN, 3.0, f64::INFINITY]).unwrap();
        let field = Field::from_2d(vec![0.0, 1.0], vec![0.0, 1.0], values, 5, "pressure").unwrap();

        assert_eq!(field.count_undefined(), 2);
        assert_eq!(field.value(&[0, 0]), Some(1.0));
        assert_eq!(field.value(&[0, 1]), None);
        assert_eq!(field.value(&[7, 7]), None);
        assert_eq!(field.min(), Some(1.0));
        assert_eq!(field.max(), Some(3.0));
        assert_eq!(
            field.iter().collect::<Vec<_>>(),
            vec![Some(1.0), None, Some(3.0), None]
        );
    }

    #[test]
    fn iteration_is_x_fastest() {
        let x = stations(0.0, 2.0, 2);
        let y = stations(0.0, 1.0, 1);
        let field = sampled(&x, &y, "x-velocity", |x, y| x + 10.0 * y);

        let values: Vec<f64> = field.iter().flatten().collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn views_need_a_2d_field() {
        let x = stations(0.0, 1.0, 2);
        let field = sampled(&x, &x, "pressure", |x, y| x + y);

        let (values, defined) = field.view_2d().unwrap();
        assert_eq!(values.dim(), (3, 3));
        assert_eq!(values[[2, 1]], 1.5);
        assert!(defined.iter().all(|&d| d));

        let mesh = Mesh::new_3d(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]);
        let cube = Field::new(mesh, ArrayD::zeros(IxDyn(&[2, 2, 2])), 0, "pressure").unwrap();
        assert!(matches!(cube.view_2d(), Err(Error::GridMismatch(_))));
    }

    #[test]
    fn relabel_keeps_values() {
        let x = stations(0.0, 1.0, 2);
        let mut field = sampled(&x, &x, "pressure", |x, y| x * y);
        let before = field.values().clone();

        field.relabel("pressure-coarse");
        field.set_time_step(100);

        assert_eq!(field.label(), "pressure-coarse");
        assert_eq!(field.time_step(), 100);
        assert_eq!(field.values(), &before);
    }
}
