//! # Traits
//!
//! Seams between the convergence analysis and the outside world. A
//! [`SolutionReader`] supplies the grid and the fields of one simulation, a
//! [`FieldSink`] consumes fields and convergence results (for example by
//! writing VTK files), and [`Numeric`] describes the floating point types that
//! the writers can serialize.

use crate::convergence::ConvergenceResult;
use crate::prelude::*;
use crate::write_vtk::Precision;

/// Reads the output of a flow solver from disk (or generates it)
///
/// Implementations are selected with [`Solver::reader`]:
///
/// ```ignore
/// let reader = gridconv::Solver::CuIbm.reader("runs/cavity/40x40", &[])?;
/// let grid = reader.read_grid()?;
/// let fields = reader.read_fields(&[FieldName::Pressure], 500)?;
/// ```
pub trait SolutionReader: Send + Sync {
    /// node stations of the cell vertices of the computational grid
    fn read_grid(&self) -> Result<Mesh, Error>;

    /// Read the fields `names` at `time_step`.
    ///
    /// The returned fields are in the same order as `names`, each labelled
    /// with its field name and tagged with `time_step`.
    fn read_fields(&self, names: &[FieldName], time_step: u32) -> Result<Vec<Field>, Error>;

    /// uniform grid spacing of the Cartesian grid, `(x_max - x_min) / n_cells`
    fn grid_spacing(&self) -> Result<f64, Error> {
        self.read_grid()?.grid_spacing()
    }

    /// Time steps to post-process: the steps of `range` when given, every
    /// saved time step otherwise.
    fn time_steps(&self, range: Option<TimeStepRange>) -> Result<Vec<u32>, Error>;
}

/// Time steps from `start` to `end` (both included) every `stride` steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Constructor)]
pub struct TimeStepRange {
    pub start: u32,
    pub end: u32,
    pub stride: u32,
}

impl TimeStepRange {
    pub fn steps(&self) -> Result<Vec<u32>, Error> {
        if self.stride == 0 {
            return Err(ConfigError::new("the time-step stride must be positive").into());
        }

        Ok((self.start..=self.end).step_by(self.stride as usize).collect())
    }
}

/// Closed interval of values used to scale a plot or an export
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Constructor)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    /// smallest and largest defined value of `field`
    pub fn of(field: &Field) -> Option<Self> {
        Some(Self::new(field.min()?, field.max()?))
    }
}

/// Consumes fields and convergence results
pub trait FieldSink {
    /// Export `field`, optionally with the range its values should be displayed in.
    ///
    /// Returns the path of the written artifact.
    fn write_field(&mut self, field: &Field, range: Option<FieldRange>) -> Result<PathBuf, Error>;

    /// Export the asymptotic-range field of a convergence result
    ///
    /// The default displays the field on `[0, 2]`, centred on the target value `1`.
    fn write_result(&mut self, result: &ConvergenceResult) -> Result<PathBuf, Error> {
        self.write_field(&result.gci, Some(FieldRange::new(0.0, 2.0)))
    }
}

/// Floating point types that can be written to a file
pub trait Numeric: num_traits::Float + ryu::Float + Send + Sync + 'static {
    /// number of bytes of one value
    const SIZE: usize;

    fn as_precision() -> Precision;

    /// lossy conversion from the analysis precision
    fn from_f64(value: f64) -> Self;

    /// push the little endian representation onto `buffer`
    fn extend_le_bytes(&self, buffer: &mut Vec<u8>);
}

impl Numeric for f32 {
    const SIZE: usize = 4;

    fn as_precision() -> Precision {
        Precision::Float32
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn extend_le_bytes(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.to_le_bytes())
    }
}

impl Numeric for f64 {
    const SIZE: usize = 8;

    fn as_precision() -> Precision {
        Precision::Float64
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn extend_le_bytes(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.to_le_bytes())
    }
}
