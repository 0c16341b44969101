use super::batch::mask_grid;
use crate::prelude::*;
use rayon::prelude::*;
use std::fmt::Write as _;

/// Error of one field of one simulation against an exact solution
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorSample {
    pub field: FieldName,
    pub description: String,
    pub grid_spacing: f64,
    pub norm: Norm,
    pub error: f64,
}

/// Errors of every case against `exact` for each field name and norm.
///
/// Each field is compared on the nodes of the same field in `mask`. Samples
/// come out grouped by field name, then norm, then in the order of `cases`.
/// Failures are logged and skipped, so a field missing from one case still
/// leaves the samples of the other cases.
pub fn errors_table(
    cases: &[Simulation],
    exact: &Simulation,
    names: &[FieldName],
    mask: &Simulation,
    norms: &[Norm],
) -> Vec<ErrorSample> {
    names
        .par_iter()
        .flat_map_iter(|&name| {
            norms.iter().flat_map(move |&norm| {
                cases.iter().filter_map(move |case| {
                    let sample = case.grid_spacing().and_then(|grid_spacing| {
                        let grid = mask_grid(mask, name)?;
                        let error = case.get_difference(exact, name, grid, norm)?;
                        Ok(ErrorSample {
                            field: name,
                            description: case.description().to_string(),
                            grid_spacing,
                            norm,
                            error,
                        })
                    });

                    match sample {
                        Ok(sample) => Some(sample),
                        Err(e) => {
                            log::warn!(
                                "{name}: no {norm} error for `{}` against `{}`: {e}",
                                case.description(),
                                exact.description()
                            );
                            None
                        }
                    }
                })
            })
        })
        .collect()
}

/// Plain-text table of error samples, one line per sample
///
/// ```text
/// # field norm case grid-spacing error
/// pressure L2 5x5 2.000000e-1 1.234568e-3
/// ```
pub fn format_errors(samples: &[ErrorSample]) -> String {
    let mut table = String::from("# field norm case grid-spacing error\n");

    for sample in samples {
        // writing to a String cannot fail
        let _ = writeln!(
            table,
            "{} {} {} {:.6e} {:.6e}",
            sample.field, sample.norm, sample.description, sample.grid_spacing, sample.error
        );
    }

    table
}
