//! # Grid convergence study
//!
//! Drives a complete study from a [`StudyConfig`]: read every case, measure the
//! errors against the exact (or finest) solution, estimate the observed order
//! of convergence on the grid triple, and write the report and the asymptotic
//! ranges of convergence.

use crate::config::{ExactSolution, StudyConfig};
use crate::convergence::{
    analyze, errors_table, format_errors, ErrorSample, GridTriple, OrderReport, ReportWriter,
};
use crate::prelude::*;
use crate::simulation::MovingVortices;
use crate::write_vtk::VtkWriter;
use rayon::prelude::*;
use std::fs;

/// Outcome of [`GridConvergenceStudy::run`]
#[derive(Debug, Clone, Default)]
pub struct StudySummary {
    /// errors of the cases against the exact solution
    pub errors: Vec<ErrorSample>,
    /// observed orders of the fields that converged
    pub orders: Vec<(FieldName, f64)>,
    /// fields without an order, with the reason
    pub failures: Vec<(FieldName, String)>,
    /// files written by the study
    pub written: Vec<PathBuf>,
}

impl StudySummary {
    pub fn order(&self, name: FieldName) -> Option<f64> {
        self.orders
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, order)| *order)
    }
}

#[derive(Debug, Clone)]
pub struct GridConvergenceStudy {
    config: StudyConfig,
    cases: Vec<Simulation>,
}

impl GridConvergenceStudy {
    /// A study whose cases are read from the sub-directories of
    /// `config.directory`.
    pub fn from_config(config: StudyConfig) -> Result<Self, Error> {
        config.validate()?;

        let cases = config
            .cases
            .iter()
            .map(|description| {
                Simulation::new(
                    description.as_str(),
                    config.case_directory(description),
                    config.solver,
                )
                .with_periodic_directions(&config.periodic_directions)
            })
            .collect();

        Ok(Self { config, cases })
    }

    /// A study over simulations already in memory.
    ///
    /// `cases` must carry the descriptions listed in the configuration, in the
    /// same order. Simulations without a solver are not read again.
    pub fn with_simulations(config: StudyConfig, cases: Vec<Simulation>) -> Result<Self, Error> {
        config.validate()?;

        let descriptions: Vec<&str> = cases.iter().map(|c| c.description()).collect();

        if descriptions != config.cases {
            return Err(ConfigError::new(format!(
                "simulations {:?} do not match the configured cases {:?}",
                descriptions, config.cases
            ))
            .into());
        }

        Ok(Self { config, cases })
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn cases(&self) -> &[Simulation] {
        &self.cases
    }

    fn case(&self, description: &str) -> Result<&Simulation, Error> {
        self.cases
            .iter()
            .find(|c| c.description() == description)
            .ok_or_else(|| ConfigError::new(format!("no case named `{description}`")).into())
    }

    /// read the grid and the configured fields of every case
    pub fn read(&mut self) -> Result<(), Error> {
        let names = &self.config.field_names;
        let time_step = self.config.time_step;

        self.cases
            .par_iter_mut()
            .filter(|case| case.solver().is_some())
            .try_for_each(|case| case.read_fields(names, time_step))
    }

    /// The solution the cases are compared against, and the cases it applies to.
    ///
    /// With [`ExactSolution::Finest`] the finest case is the reference and is
    /// left out of the error table.
    fn exact(&self) -> Result<(Simulation, &[Simulation]), Error> {
        let (finest, coarser) = self
            .cases
            .split_last()
            .ok_or_else(|| ConfigError::new("the study has no cases"))?;

        match self.config.exact {
            ExactSolution::Finest => Ok((finest.clone(), coarser)),
            ExactSolution::MovingVortices { time } => {
                let grid = finest.grid().ok_or_else(|| {
                    GridMismatch::new(finest.description(), "the grid has not been read")
                })?;

                let fields = MovingVortices::new(grid, time)?.fields(
                    grid,
                    &self.config.field_names,
                    self.config.time_step,
                )?;

                let exact = Simulation::from_fields("exact", grid.clone(), fields)?;
                Ok((exact, self.cases.as_slice()))
            }
        }
    }

    /// Read the cases and run the whole study.
    ///
    /// Failures that concern a single field are logged and collected in the
    /// summary; only configuration, reading and writing errors abort the run.
    pub fn run(&mut self) -> Result<StudySummary, Error> {
        self.read()?;

        let config = &self.config;
        let names = &config.field_names;
        let [coarse, medium, fine] = config.triple()?;
        let mask = self.case(config.mask()?)?;

        let mut summary = StudySummary::default();

        let (exact, compared) = self.exact()?;
        summary.errors = errors_table(compared, &exact, names, mask, &config.norms);

        let triple = GridTriple::new(self.case(coarse)?, self.case(medium)?, self.case(fine)?)?;
        let norm = config.norms.first().copied().unwrap_or_default();

        let mut report = OrderReport::new(config.save_name.as_str(), &triple, config.time_step);
        let mut results = Vec::new();

        for (name, result) in analyze(&triple, names, mask, norm) {
            match result {
                Ok(result) => {
                    log::info!("{name}: observed order {}", result.order);
                    report.push(name, result.order);
                    summary.orders.push((name, result.order));
                    results.push(result);
                }
                Err(e) => summary.failures.push((name, e.to_string())),
            }
        }

        let output = &config.output;
        summary.written.push(ReportWriter::new(&output.directory).write(&report)?);

        let errors_path = output
            .directory
            .join(format!("{}_errors_{:07}.dat", config.save_name, config.time_step));
        fs::write(&errors_path, format_errors(&summary.errors))?;
        summary.written.push(errors_path);

        if output.vtk {
            let mut writer = VtkWriter::from_config(output);

            for result in &results {
                summary.written.push(writer.write_result(result)?);
            }
        }

        log::info!(
            "study `{}` done: {} order(s), {} failure(s), {} file(s) written",
            config.save_name,
            summary.orders.len(),
            summary.failures.len(),
            summary.written.len()
        );

        Ok(summary)
    }
}
