//! # Grid convergence analysis
//!
//! Estimates of the discretization error from solutions computed on three (or two)
//! nested grids with a constant refinement ratio `r`:
//!
//! * [`observed_order`]: the exponent `p` of `error ≈ C h^p`,
//! * [`grid_convergence_index`]: the point-wise Grid Convergence Index between two
//!   grids, in percent,
//! * [`asymptotic_range`]: `GCI_23 / (GCI_12 r^p)`, close to `1` when the three
//!   solutions lie in the asymptotic range of convergence.
//!
//! All fields are restricted onto a shared mask grid (usually the coarsest grid)
//! before being compared. The [`batch`] module runs these computations for many
//! field names in parallel.

pub mod batch;
mod errors;
mod gci;
mod order;
mod report;

pub use crate::field::Norm;
pub use batch::{analyze, asymptotic_ranges, observed_orders, GridTriple};
pub use errors::{errors_table, format_errors, ErrorSample};
pub use gci::{asymptotic_range, grid_convergence_index, GCI_TOLERANCE};
pub use order::observed_order;
pub use report::{OrderReport, ReportWriter};

use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// Safety factor `Fs` of the Grid Convergence Index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SafetyFactor {
    /// the order was estimated from three or more grids (`1.25`)
    ThreeGrids,
    /// the order was assumed, only two grids were used (`3.0`)
    TwoGrids,
    Custom(f64),
}

impl SafetyFactor {
    pub fn value(&self) -> f64 {
        match self {
            SafetyFactor::ThreeGrids => 1.25,
            SafetyFactor::TwoGrids => 3.0,
            SafetyFactor::Custom(value) => *value,
        }
    }
}

/// Order of convergence of one quantity together with its asymptotic-range field
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceResult {
    pub field_name: FieldName,
    pub order: f64,
    pub gci: Field,
}

/// Refinement ratio between two grid spacings, `coarse / fine`
pub fn refinement_ratio(coarse_spacing: f64, fine_spacing: f64) -> Result<f64, Error> {
    let ratio = coarse_spacing / fine_spacing;

    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(DegenerateConvergence::new(
            "refinement ratio",
            format!("spacings {coarse_spacing} and {fine_spacing} do not define a ratio"),
        )
        .into());
    }

    Ok(ratio)
}

/// reject ratios for which `ln(r)` is zero or undefined
pub(crate) fn check_ratio(label: &str, ratio: f64) -> Result<(), Error> {
    if !ratio.is_finite() || ratio <= 0.0 || ratio == 1.0 {
        return Err(DegenerateConvergence::new(
            label,
            format!("refinement ratio {ratio} must be positive, finite and different from 1"),
        )
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_factors() {
        assert_eq!(SafetyFactor::ThreeGrids.value(), 1.25);
        assert_eq!(SafetyFactor::TwoGrids.value(), 3.0);
        assert_eq!(SafetyFactor::Custom(1.5).value(), 1.5);
    }

    #[test]
    fn ratio_of_spacings() {
        assert_eq!(refinement_ratio(0.1, 0.05).unwrap(), 2.0);
        assert!(refinement_ratio(0.1, 0.0).is_err());
        assert!(refinement_ratio(-0.1, 0.05).is_err());
    }

    #[test]
    fn unit_ratio_is_degenerate() {
        assert!(check_ratio("pressure", 1.0).is_err());
        assert!(check_ratio("pressure", f64::NAN).is_err());
        assert!(check_ratio("pressure", 3.0).is_ok());
    }
}
