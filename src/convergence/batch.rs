//! Convergence analysis of many quantities at once
//!
//! Every field name is processed independently on the rayon thread pool. Each
//! one yields its own `Result`, so a degenerate or missing quantity never stops
//! the analysis of the others.
//!
//! The mask is a simulation rather than a grid: each quantity is compared on
//! the nodes of the same quantity in the mask simulation, which keeps staggered
//! components on their own layout.

use super::{asymptotic_range, observed_order, refinement_ratio};
use crate::prelude::*;
use rayon::prelude::*;

/// relative tolerance on the agreement of the two refinement ratios
const RATIO_TOLERANCE: f64 = 1e-6;

/// Three simulations of the same flow on successively refined grids
#[derive(Debug, Clone, Copy)]
pub struct GridTriple<'a> {
    pub coarse: &'a Simulation,
    pub medium: &'a Simulation,
    pub fine: &'a Simulation,
    /// refinement ratio `h_coarse / h_medium`
    pub ratio: f64,
}

impl<'a> GridTriple<'a> {
    /// Group three simulations whose grids have been read.
    ///
    /// The refinement ratio is taken from the (coarse, medium) pair. A
    /// (medium, fine) ratio that disagrees is only reported with a warning:
    /// the analysis assumes a constant ratio and it is up to the caller to
    /// provide one.
    pub fn new(
        coarse: &'a Simulation,
        medium: &'a Simulation,
        fine: &'a Simulation,
    ) -> Result<Self, Error> {
        let ratio = refinement_ratio(coarse.grid_spacing()?, medium.grid_spacing()?)?;
        let fine_ratio = refinement_ratio(medium.grid_spacing()?, fine.grid_spacing()?)?;

        if ((fine_ratio - ratio) / ratio).abs() > RATIO_TOLERANCE {
            log::warn!(
                "refinement ratios differ between `{}`/`{}` ({ratio}) and `{}`/`{}` ({fine_ratio}), using {ratio}",
                coarse.description(),
                medium.description(),
                medium.description(),
                fine.description(),
            );
        }

        Ok(Self {
            coarse,
            medium,
            fine,
            ratio,
        })
    }

    /// descriptions of the three grids, for messages
    pub fn describe(&self) -> String {
        format!(
            "{}/{}/{}",
            self.coarse.description(),
            self.medium.description(),
            self.fine.description()
        )
    }

    fn fields(&self, name: FieldName) -> Result<(&'a Field, &'a Field, &'a Field), Error> {
        Ok((
            self.coarse.field(name)?,
            self.medium.field(name)?,
            self.fine.field(name)?,
        ))
    }
}

/// nodes of the field `name` in the mask simulation
pub(crate) fn mask_grid(mask: &Simulation, name: FieldName) -> Result<&Mesh, Error> {
    Ok(mask.field(name)?.mesh())
}

/// Observed order of convergence of each field in `names`, restricted onto the
/// nodes of the same field in `mask`
pub fn observed_orders(
    triple: &GridTriple,
    names: &[FieldName],
    mask: &Simulation,
    norm: Norm,
) -> Vec<(FieldName, Result<f64, Error>)> {
    log::info!(
        "computing the observed order of {} field(s) on grids {}",
        names.len(),
        triple.describe()
    );

    names
        .par_iter()
        .map(|&name| {
            let order = triple.fields(name).and_then(|(coarse, medium, fine)| {
                let grid = mask_grid(mask, name)?;
                observed_order(coarse, medium, fine, triple.ratio, grid, norm)
            });

            if let Err(e) = &order {
                log::warn!("{name}: no observed order on grids {}: {e}", triple.describe());
            }

            (name, order)
        })
        .collect()
}

/// Asymptotic range of convergence of each field whose order is known
pub fn asymptotic_ranges(
    triple: &GridTriple,
    orders: &[(FieldName, f64)],
    mask: &Simulation,
) -> Vec<(FieldName, Result<Field, Error>)> {
    orders
        .par_iter()
        .map(|&(name, order)| {
            let range = triple.fields(name).and_then(|(coarse, medium, fine)| {
                let grid = mask_grid(mask, name)?;
                asymptotic_range(coarse, medium, fine, order, triple.ratio, grid)
            });

            if let Err(e) = &range {
                log::warn!(
                    "{name}: no asymptotic range on grids {}: {e}",
                    triple.describe()
                );
            }

            (name, range)
        })
        .collect()
}

/// Observed order and asymptotic range of each field in `names`
pub fn analyze(
    triple: &GridTriple,
    names: &[FieldName],
    mask: &Simulation,
    norm: Norm,
) -> Vec<(FieldName, Result<ConvergenceResult, Error>)> {
    names
        .par_iter()
        .map(|&name| {
            let result = triple.fields(name).and_then(|(coarse, medium, fine)| {
                let grid = mask_grid(mask, name)?;
                let order = observed_order(coarse, medium, fine, triple.ratio, grid, norm)?;
                let gci = asymptotic_range(coarse, medium, fine, order, triple.ratio, grid)?;

                log::debug!("{name}: order {order} on grids {}", triple.describe());

                Ok(ConvergenceResult {
                    field_name: name,
                    order,
                    gci,
                })
            });

            if let Err(e) = &result {
                log::warn!(
                    "{name}: convergence analysis failed on grids {}: {e}",
                    triple.describe()
                );
            }

            (name, result)
        })
        .collect()
}
