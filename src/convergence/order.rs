use super::check_ratio;
use crate::prelude::*;

/// Observed order of convergence from three solutions on nested grids.
///
/// The three fields are restricted onto `grid`, then
///
/// ```text
/// p = ln(||medium - coarse|| / ||fine - medium||) / ln(ratio)
/// ```
///
/// `ratio` must be the refinement ratio of both the (coarse, medium) and the
/// (medium, fine) pair; this is not checked here.
///
/// ## Errors
///
/// [`DegenerateConvergence`] when either difference vanishes, when `ratio` is
/// not a valid refinement ratio, or when the result is not finite.
pub fn observed_order(
    coarse: &Field,
    medium: &Field,
    fine: &Field,
    ratio: f64,
    grid: &Mesh,
    norm: Norm,
) -> Result<f64, Error> {
    let label = coarse.label();
    check_ratio(label, ratio)?;

    let coarse = coarse.restriction(grid)?;
    let medium = medium.restriction(grid)?;
    let fine = fine.restriction(grid)?;

    let medium_coarse = medium.subtract(&coarse, None)?.norm(norm)?;
    let fine_medium = fine.subtract(&medium, None)?.norm(norm)?;

    if fine_medium == 0.0 {
        return Err(DegenerateConvergence::new(
            label,
            "fine and medium solutions are identical on the mask grid",
        )
        .into());
    }

    if medium_coarse == 0.0 {
        return Err(DegenerateConvergence::new(
            label,
            "medium and coarse solutions are identical on the mask grid",
        )
        .into());
    }

    let order = (medium_coarse / fine_medium).ln() / ratio.ln();

    if !order.is_finite() {
        return Err(DegenerateConvergence::new(
            label,
            format!("order of convergence is not finite ({order})"),
        )
        .into());
    }

    log::debug!(
        "{label}: {norm}(m-c) = {medium_coarse:e}, {norm}(f-m) = {fine_medium:e}, order {order}"
    );

    Ok(order)
}
