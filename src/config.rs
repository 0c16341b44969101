//! # Configuration
//!
//! A grid convergence study is described by a YAML file:
//!
//! ```yaml
//! directory: runs/lid-driven-cavity
//! solver:
//!   name: cuibm
//! periodic_directions: [x]
//! cases: ["20", "60", "180", "540"]
//! triple: ["20", "60", "180"]
//! mask: "20"
//! time_step: 500
//! field_names: [x-velocity, y-velocity, pressure]
//! norms: [l2, linf]
//! exact:
//!   kind: finest
//! save_name: cavity
//! output:
//!   directory: results
//!   encoding: base64
//!   precision: float32
//!   vtk: true
//! ```
//!
//! Every case is a sub-directory of `directory` named after its description.
//! Cases are listed from the coarsest to the finest grid.

use crate::prelude::*;
use crate::write_vtk::{Encoding, Precision};
use serde::{Deserialize, Serialize};

/// Where and how results are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub directory: PathBuf,
    pub encoding: Encoding,
    pub precision: Precision,
    /// write the asymptotic range of convergence of each field as VTK
    pub vtk: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            encoding: Encoding::default(),
            precision: Precision::default(),
            vtk: false,
        }
    }
}

/// Solution the cases are compared against when measuring errors
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExactSolution {
    /// the finest case stands in for the exact solution
    #[default]
    Finest,
    /// analytical moving vortices at `time`, sampled on the finest grid
    MovingVortices { time: f64 },
}

fn default_norms() -> Vec<Norm> {
    vec![Norm::L2]
}

fn default_save_name() -> String {
    String::from("orders")
}

/// Description of a complete grid convergence study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    /// parent directory of the cases
    pub directory: PathBuf,
    pub solver: Solver,
    /// directions with periodic boundary conditions in every case
    #[serde(default)]
    pub periodic_directions: Vec<Coordinate>,
    /// case descriptions ordered from the coarsest to the finest grid
    pub cases: Vec<String>,
    /// case whose nodes the fields are compared on, the coarsest of the
    /// triple when absent
    #[serde(default)]
    pub mask: Option<String>,
    /// cases used for the observed order, the three finest when absent
    #[serde(default)]
    pub triple: Option<[String; 3]>,
    #[serde(default)]
    pub time_step: u32,
    pub field_names: Vec<FieldName>,
    #[serde(default = "default_norms")]
    pub norms: Vec<Norm>,
    #[serde(default)]
    pub exact: ExactSolution,
    #[serde(default = "default_save_name")]
    pub save_name: String,
    #[serde(default)]
    pub output: ExportConfig,
}

impl StudyConfig {
    /// parse and validate a configuration
    pub fn from_yaml_str(yaml: &str) -> Result<Self, Error> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// read, parse and validate a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;

        log::info!("reading the study configuration from {}", path.display());

        Self::from_yaml_str(&yaml)
    }

    /// descriptions of the (coarse, medium, fine) cases
    pub fn triple(&self) -> Result<[&str; 3], Error> {
        match &self.triple {
            Some([coarse, medium, fine]) => Ok([coarse.as_str(), medium.as_str(), fine.as_str()]),
            None => match self.cases.as_slice() {
                [.., coarse, medium, fine] => Ok([coarse.as_str(), medium.as_str(), fine.as_str()]),
                _ => Err(ConfigError::new(format!(
                    "a convergence study needs three cases, {} given",
                    self.cases.len()
                ))
                .into()),
            },
        }
    }

    /// description of the case holding the comparison nodes
    pub fn mask(&self) -> Result<&str, Error> {
        match &self.mask {
            Some(mask) => Ok(mask.as_str()),
            None => Ok(self.triple()?[0]),
        }
    }

    /// directory of the case `description`
    pub fn case_directory(&self, description: &str) -> PathBuf {
        self.directory.join(description)
    }

    /// check the relations between entries that serde cannot express
    pub fn validate(&self) -> Result<(), Error> {
        if self.field_names.is_empty() {
            return Err(ConfigError::new("no field names to analyze").into());
        }

        if self.norms.is_empty() {
            return Err(ConfigError::new("at least one norm is needed").into());
        }

        for (i, case) in self.cases.iter().enumerate() {
            if self.cases[..i].contains(case) {
                return Err(ConfigError::new(format!("case `{case}` is listed twice")).into());
            }
        }

        let triple = self.triple()?;

        for case in triple.iter().chain(std::iter::once(&self.mask()?)) {
            if !self.cases.iter().any(|c| c == case) {
                return Err(ConfigError::new(format!(
                    "`{case}` is not one of the cases {:?}",
                    self.cases
                ))
                .into());
            }
        }

        if triple[0] == triple[1] || triple[1] == triple[2] || triple[0] == triple[2] {
            return Err(ConfigError::new(format!(
                "the grid triple {triple:?} needs three different cases"
            ))
            .into());
        }

        Ok(())
    }
}
