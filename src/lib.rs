#![doc = include_str!("../README.md")]

pub mod config;
pub mod convergence;
pub mod error;
pub mod field;
pub mod mesh;
pub mod prelude;
pub mod quantities;
pub mod simulation;
pub mod study;
mod traits;
pub mod write_vtk;

pub use traits::{FieldRange, FieldSink, Numeric, SolutionReader, TimeStepRange};

pub use field::{Direction, Field, Gridline};
pub use mesh::{Coordinate, Mesh};

pub use convergence::{
    asymptotic_range, grid_convergence_index, observed_order, ConvergenceResult, Norm,
    SafetyFactor,
};

pub use config::{ExportConfig, StudyConfig};
pub use simulation::{Simulation, Solver};
pub use study::{GridConvergenceStudy, StudySummary};
pub use write_vtk::{write_vtk, Encoding, Precision, VtkWriter};

pub use ndarray;

use derive_more::From;
use serde::{Deserialize, Serialize};

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug, From)]
pub enum Error {
    #[error("{0}")]
    GridMismatch(error::GridMismatch),
    #[error("{0}")]
    OutOfRange(error::OutOfRange),
    #[error("{0}")]
    DegenerateConvergence(error::DegenerateConvergence),
    #[error("{0}")]
    UndefinedValues(error::UndefinedValues),
    #[error("{0}")]
    MissingField(error::MissingField),
    #[error("{0}")]
    Parse(error::ParseOutput),
    #[error("{0}")]
    Config(error::ConfigError),
    #[error("An io error occured: `{0}`")]
    Io(std::io::Error),
    #[error("Could not read yaml configuration: `{0}`")]
    Yaml(serde_yaml::Error),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(quick_xml::Error),
}

/// Name of a physical quantity produced by a flow solver
///
/// The string form (`"x-velocity"`, `"pressure"`, ...) is what shows up in
/// configuration files, reports, and the labels of fields read from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldName {
    Pressure,
    Vorticity,
    XVelocity,
    YVelocity,
    ZVelocity,
    XFlux,
    YFlux,
    ZFlux,
}

impl FieldName {
    pub const ALL: [FieldName; 8] = [
        FieldName::Pressure,
        FieldName::Vorticity,
        FieldName::XVelocity,
        FieldName::YVelocity,
        FieldName::ZVelocity,
        FieldName::XFlux,
        FieldName::YFlux,
        FieldName::ZFlux,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pressure => "pressure",
            Self::Vorticity => "vorticity",
            Self::XVelocity => "x-velocity",
            Self::YVelocity => "y-velocity",
            Self::ZVelocity => "z-velocity",
            Self::XFlux => "x-flux",
            Self::YFlux => "y-flux",
            Self::ZFlux => "z-flux",
        }
    }

    /// velocity component aligned with `coordinate`
    pub fn velocity(coordinate: Coordinate) -> Self {
        match coordinate {
            Coordinate::X => Self::XVelocity,
            Coordinate::Y => Self::YVelocity,
            Coordinate::Z => Self::ZVelocity,
        }
    }

    /// flux component aligned with `coordinate`
    pub fn flux(coordinate: Coordinate) -> Self {
        match coordinate {
            Coordinate::X => Self::XFlux,
            Coordinate::Y => Self::YFlux,
            Coordinate::Z => Self::ZFlux,
        }
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldName {
    type Err = error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| error::ConfigError::new(format!("unknown field name `{s}`")))
    }
}

#[cfg(test)]
mod helpers {
    use crate::Field;
    use ndarray::Array2;

    /// uniform stations on `[start, end]` with `n_cells` cells
    pub fn stations(start: f64, end: f64, n_cells: usize) -> Vec<f64> {
        let h = (end - start) / n_cells as f64;
        (0..=n_cells).map(|i| start + h * i as f64).collect()
    }

    /// sample `f(x, y)` on the tensor product of `x` and `y`
    pub fn sampled<F: Fn(f64, f64) -> f64>(x: &[f64], y: &[f64], label: &str, f: F) -> Field {
        let values = Array2::from_shape_fn((y.len(), x.len()), |(j, i)| f(x[i], y[j]));
        Field::from_2d(x.to_vec(), y.to_vec(), values, 0, label).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::FieldName;

    #[test]
    fn field_name_round_trip_through_strings() {
        for name in FieldName::ALL {
            let parsed: FieldName = name.to_string().parse().unwrap();
            assert_eq!(parsed, name);
        }

        assert!("velocity".parse::<FieldName>().is_err());
    }
}
