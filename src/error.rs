//! Payloads of the [`Error`](crate::Error) variants
//!
//! Every numerical precondition that is violated inside the library is reported
//! through one of these types. None of the operations in this crate return
//! `NaN` or `inf` in place of an error.

use crate::mesh::Coordinate;
use crate::FieldName;
use derive_more::{Constructor, Display};

/// two fields (or a field and a target grid) that should share nodes do not
#[derive(Display, Debug, Clone, PartialEq)]
#[display(fmt = "grid mismatch for field `{label}`: {reason}")]
pub struct GridMismatch {
    pub label: String,
    pub reason: String,
}

impl GridMismatch {
    pub(crate) fn new<T: Into<String>, U: Into<String>>(label: T, reason: U) -> Self {
        Self {
            label: label.into(),
            reason: reason.into(),
        }
    }
}

/// a requested gridline or restriction target lies outside the sampled domain
#[derive(Display, Debug, Clone, PartialEq)]
#[display(
    fmt = "position {position} along {coordinate} is outside the domain [{lower}, {upper}] of field `{label}`"
)]
pub struct OutOfRange {
    pub label: String,
    pub coordinate: Coordinate,
    pub position: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutOfRange {
    pub(crate) fn new<T: Into<String>>(
        label: T,
        coordinate: Coordinate,
        position: f64,
        bounds: (f64, f64),
    ) -> Self {
        Self {
            label: label.into(),
            coordinate,
            position,
            lower: bounds.0,
            upper: bounds.1,
        }
    }
}

/// an order-of-convergence or GCI computation would divide by a zero term
#[derive(Display, Debug, Clone, PartialEq)]
#[display(fmt = "degenerate convergence data for `{label}`: {reason}")]
pub struct DegenerateConvergence {
    pub label: String,
    pub reason: String,
}

impl DegenerateConvergence {
    pub(crate) fn new<T: Into<String>, U: Into<String>>(label: T, reason: U) -> Self {
        Self {
            label: label.into(),
            reason: reason.into(),
        }
    }
}

/// a reduction was asked for a field that still holds undefined nodes
#[derive(Display, Debug, Clone, PartialEq, Constructor)]
#[display(fmt = "field `{label}` contains {count} undefined node(s)")]
pub struct UndefinedValues {
    pub label: String,
    pub count: usize,
}

/// a simulation was asked for a field that was never read
#[derive(Display, Debug, Clone, PartialEq, Constructor)]
#[display(fmt = "simulation `{description}` has no `{field}` field loaded")]
pub struct MissingField {
    pub description: String,
    pub field: FieldName,
}

/// solver output on disk could not be interpreted
#[derive(Display, Debug, Clone, PartialEq)]
#[display(fmt = "failed to parse solver output `{path}`: {reason}")]
pub struct ParseOutput {
    pub path: String,
    pub reason: String,
}

impl ParseOutput {
    pub(crate) fn new<U: Into<String>>(path: &std::path::Path, reason: U) -> Self {
        Self {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}

/// the study configuration is inconsistent
#[derive(Display, Debug, Clone, PartialEq)]
#[display(fmt = "invalid configuration: {reason}")]
pub struct ConfigError {
    pub reason: String,
}

impl ConfigError {
    pub(crate) fn new<T: Into<String>>(reason: T) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl std::error::Error for ConfigError {}
