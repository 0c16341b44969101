//! Common traits and types that are useful for working with `gridconv`
#![allow(unused_imports)]

pub use crate::convergence::{ConvergenceResult, Norm, SafetyFactor};
pub use crate::field::{Direction, Field, Gridline};
pub use crate::mesh::{Coordinate, Mesh};
pub use crate::simulation::{Simulation, Solver};
pub use crate::traits::{FieldRange, FieldSink, Numeric, SolutionReader, TimeStepRange};
pub use crate::FieldName;

pub(crate) use crate::error::{
    ConfigError, DegenerateConvergence, GridMismatch, MissingField, OutOfRange, ParseOutput,
    UndefinedValues,
};
pub(crate) use crate::Error;

pub(crate) use std::io::Write;
pub(crate) use std::path::{Path, PathBuf};

pub(crate) use ndarray::{ArrayD, ArrayView2, Axis, Ix2, IxDyn, Zip};
