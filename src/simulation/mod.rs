//! # Simulations
//!
//! A [`Simulation`] is one run of a flow solver: a directory on disk, the solver
//! that wrote it, the computational grid, and the fields read so far. Readers
//! for the supported solvers implement [`SolutionReader`] and are picked with
//! [`Solver::reader`].

mod cuibm;
mod moving_vortices;

pub use cuibm::{saved_time_steps, CuIbmReader};
pub use moving_vortices::{MovingVortices, MovingVorticesReader};

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flow solvers whose output can be read
///
/// In a configuration file the solver is a map tagged by `name`:
///
/// ```yaml
/// solver:
///   name: moving-vortices
///   time: 0.25
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum Solver {
    /// ASCII output of the cuIBM immersed-boundary solver
    #[serde(rename = "cuibm")]
    CuIbm,
    /// Analytical Taylor-Green-like moving vortices, evaluated at `time` on the
    /// grid stored in the simulation directory
    MovingVortices { time: f64 },
}

impl Solver {
    /// Reader for a simulation stored in `directory`, with periodic boundary
    /// conditions along the `periodic` directions.
    pub fn reader<P: AsRef<Path>>(
        &self,
        directory: P,
        periodic: &[Coordinate],
    ) -> Result<Box<dyn SolutionReader>, Error> {
        let directory = directory.as_ref();

        if !directory.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("simulation directory {} does not exist", directory.display()),
            )
            .into());
        }

        let reader: Box<dyn SolutionReader> = match *self {
            Solver::CuIbm => {
                Box::new(CuIbmReader::new(directory).with_periodic_directions(periodic))
            }
            Solver::MovingVortices { time } => {
                Box::new(MovingVorticesReader::new(directory, time))
            }
        };

        Ok(reader)
    }
}

/// One simulation and the fields read from it
#[derive(Debug, Clone)]
pub struct Simulation {
    description: String,
    directory: PathBuf,
    solver: Option<Solver>,
    periodic: Vec<Coordinate>,
    grid: Option<Mesh>,
    fields: HashMap<FieldName, Field>,
    derived: HashMap<String, Field>,
}

impl Simulation {
    pub fn new<T: Into<String>, P: Into<PathBuf>>(
        description: T,
        directory: P,
        solver: Solver,
    ) -> Self {
        Self {
            description: description.into(),
            directory: directory.into(),
            solver: Some(solver),
            periodic: Vec::new(),
            grid: None,
            fields: HashMap::new(),
            derived: HashMap::new(),
        }
    }

    /// Simulation built from fields already in memory.
    ///
    /// Each field is stored under the field name given by its label.
    pub fn from_fields<T: Into<String>>(
        description: T,
        grid: Mesh,
        fields: Vec<Field>,
    ) -> Result<Self, Error> {
        let mut simulation = Self {
            description: description.into(),
            directory: PathBuf::new(),
            solver: None,
            periodic: Vec::new(),
            grid: Some(grid),
            fields: HashMap::new(),
            derived: HashMap::new(),
        };

        for field in fields {
            let name: FieldName = field.label().parse()?;
            simulation.insert_field(name, field);
        }

        Ok(simulation)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn solver(&self) -> Option<Solver> {
        self.solver
    }

    /// directions with periodic boundary conditions, used when reading fields
    pub fn with_periodic_directions(mut self, periodic: &[Coordinate]) -> Self {
        self.periodic = periodic.to_vec();
        self
    }

    pub fn periodic_directions(&self) -> &[Coordinate] {
        &self.periodic
    }

    fn reader(&self) -> Result<Box<dyn SolutionReader>, Error> {
        match &self.solver {
            Some(solver) => solver.reader(&self.directory, &self.periodic),
            None => Err(ConfigError::new(format!(
                "simulation `{}` has no solver to read from",
                self.description
            ))
            .into()),
        }
    }

    /// read the computational grid from disk
    pub fn read_grid(&mut self) -> Result<&Mesh, Error> {
        let grid = self.reader()?.read_grid()?;

        log::info!(
            "{}: read a {} grid from {}",
            self.description,
            grid.describe(),
            self.directory.display()
        );

        Ok(&*self.grid.insert(grid))
    }

    /// Read the fields `names` at `time_step`, replacing any previously read field
    /// of the same name.
    pub fn read_fields(&mut self, names: &[FieldName], time_step: u32) -> Result<(), Error> {
        let reader = self.reader()?;

        if self.grid.is_none() {
            self.grid = Some(reader.read_grid()?);
        }

        let fields = reader.read_fields(names, time_step)?;

        if fields.len() != names.len() {
            return Err(ParseOutput::new(
                &self.directory,
                format!("asked for {} field(s), got {}", names.len(), fields.len()),
            )
            .into());
        }

        for (name, field) in names.iter().zip(fields) {
            log::info!(
                "{}: read {} at time-step {} ({} nodes)",
                self.description,
                name,
                time_step,
                field.mesh().describe()
            );
            self.insert_field(*name, field);
        }

        Ok(())
    }

    /// Time steps to post-process: the steps of `range`, or every time step
    /// saved in the simulation directory.
    pub fn time_steps(&self, range: Option<TimeStepRange>) -> Result<Vec<u32>, Error> {
        match range {
            Some(range) => range.steps(),
            None => self.reader()?.time_steps(None),
        }
    }

    pub fn grid(&self) -> Option<&Mesh> {
        self.grid.as_ref()
    }

    /// uniform grid spacing of the computational grid
    pub fn grid_spacing(&self) -> Result<f64, Error> {
        match &self.grid {
            Some(grid) => grid.grid_spacing(),
            None => Err(GridMismatch::new(
                self.description.clone(),
                "the grid has not been read",
            )
            .into()),
        }
    }

    pub fn field(&self, name: FieldName) -> Result<&Field, Error> {
        self.fields
            .get(&name)
            .ok_or_else(|| MissingField::new(self.description.clone(), name).into())
    }

    pub fn insert_field(&mut self, name: FieldName, field: Field) {
        self.fields.insert(name, field);
    }

    /// names of the fields read so far, sorted
    pub fn field_names(&self) -> Vec<FieldName> {
        let mut names: Vec<FieldName> = self.fields.keys().copied().collect();
        names.sort();
        names
    }

    /// Subtract the field `name` of `other` from the same field of this simulation.
    ///
    /// The difference is labelled `label` (default `<name>-subtracted`) and kept
    /// under that label (see [`Simulation::derived`]).
    pub fn subtract(
        &mut self,
        other: &Simulation,
        name: FieldName,
        label: Option<&str>,
    ) -> Result<&Field, Error> {
        let label = label
            .map(str::to_string)
            .unwrap_or_else(|| format!("{name}-subtracted"));
        let difference = self
            .field(name)?
            .subtract(other.field(name)?, Some(label.as_str()))?;

        self.derived.insert(label.clone(), difference);

        self.derived
            .get(&label)
            .ok_or_else(|| MissingField::new(self.description.clone(), name).into())
    }

    /// field stored by a combinator such as [`Simulation::subtract`]
    pub fn derived(&self, key: &str) -> Option<&Field> {
        self.derived.get(key)
    }

    /// Difference between the field `name` of this simulation and of `exact`,
    /// measured on `mask`
    pub fn get_difference(
        &self,
        exact: &Simulation,
        name: FieldName,
        mask: &Mesh,
        norm: Norm,
    ) -> Result<f64, Error> {
        self.field(name)?.get_difference(exact.field(name)?, mask, norm)
    }
}
