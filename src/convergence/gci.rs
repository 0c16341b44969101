use super::{check_ratio, SafetyFactor};
use crate::prelude::*;

/// nodes where either solution is smaller than this (in magnitude) have no GCI
pub const GCI_TOLERANCE: f64 = 1.0e-6;

/// Point-wise Grid Convergence Index between two solutions, in percent.
///
/// ```text
/// GCI = Fs * |(coarse - fine) / fine| / (ratio^order - 1) * 100
/// ```
///
/// Both fields are restricted onto `grid`. Nodes where `|coarse|` or `|fine|`
/// is below [`GCI_TOLERANCE`] are undefined in the result. The result lives on
/// the stations of `grid`, is labelled `GCI-<coarse label>`, and carries the
/// time-step of `coarse`.
pub fn grid_convergence_index(
    coarse: &Field,
    fine: &Field,
    order: f64,
    ratio: f64,
    grid: &Mesh,
    safety_factor: SafetyFactor,
) -> Result<Field, Error> {
    let label = format!("GCI-{}", coarse.label());
    check_ratio(&label, ratio)?;

    let denominator = ratio.powf(order) - 1.0;

    if denominator == 0.0 || !denominator.is_finite() {
        return Err(DegenerateConvergence::new(
            label,
            format!("ratio^order - 1 = {denominator} for ratio {ratio} and order {order}"),
        )
        .into());
    }

    let coarse = coarse.restriction(grid)?;
    let fine = fine.restriction(grid)?;

    let fs = safety_factor.value();
    let mesh = coarse.mesh().clone();

    let gci = coarse.zip_with(&fine, mesh, label, |c, f| {
        if c.abs() < GCI_TOLERANCE || f.abs() < GCI_TOLERANCE {
            None
        } else {
            Some(fs * ((c - f) / f).abs() / denominator * 100.0)
        }
    })?;

    if gci.count_undefined() > 0 {
        log::debug!(
            "{}: {} node(s) masked out of {}",
            gci.label(),
            gci.count_undefined(),
            gci.len()
        );
    }

    Ok(gci)
}

/// Asymptotic-range diagnostic `GCI_23 / (GCI_12 * ratio^order)`.
///
/// `GCI_23` compares `coarse` and `medium`, `GCI_12` compares `medium` and
/// `fine`, both with [`SafetyFactor::ThreeGrids`]. A node is undefined when
/// either GCI is undefined there or when `GCI_12` vanishes. Values close to
/// `1` indicate that the solutions are in the asymptotic range of convergence.
pub fn asymptotic_range(
    coarse: &Field,
    medium: &Field,
    fine: &Field,
    order: f64,
    ratio: f64,
    grid: &Mesh,
) -> Result<Field, Error> {
    let safety = SafetyFactor::ThreeGrids;
    let gci_23 = grid_convergence_index(coarse, medium, order, ratio, grid, safety)?;
    let gci_12 = grid_convergence_index(medium, fine, order, ratio, grid, safety)?;

    let scale = ratio.powf(order);
    let label = format!("asymptotic-range-{}", coarse.label());
    let mesh = gci_23.mesh().clone();

    gci_23.zip_with(&gci_12, mesh, label, |gci_23, gci_12| {
        if gci_12 == 0.0 {
            None
        } else {
            Some(gci_23 / (gci_12 * scale)).filter(|v| v.is_finite())
        }
    })
}
