use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// Norm used to measure the difference between two fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    /// Euclidean (Frobenius) norm of the flattened values
    #[default]
    L2,
    /// maximum absolute value
    Linf,
}

impl Norm {
    fn reduce<I: Iterator<Item = f64>>(&self, values: I) -> f64 {
        match self {
            Norm::L2 => values.map(|v| v * v).sum::<f64>().sqrt(),
            Norm::Linf => values.map(f64::abs).fold(0.0, f64::max),
        }
    }
}

impl std::fmt::Display for Norm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Norm::L2 => f.write_str("L2"),
            Norm::Linf => f.write_str("Linf"),
        }
    }
}

impl std::str::FromStr for Norm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l2" => Ok(Norm::L2),
            "linf" => Ok(Norm::Linf),
            _ => Err(ConfigError::new(format!(
                "unknown norm `{s}`, expected `L2` or `Linf`"
            ))),
        }
    }
}

impl Field {
    /// Norm of the values of this field.
    ///
    /// Fails with [`UndefinedValues`] instead of skipping undefined nodes.
    pub fn norm(&self, norm: Norm) -> Result<f64, Error> {
        let count = self.count_undefined();

        if count > 0 {
            return Err(UndefinedValues::new(self.label().to_string(), count).into());
        }

        Ok(norm.reduce(self.values().iter().copied()))
    }

    /// Difference between this field and `exact`, measured on the nodes of `mask`.
    ///
    /// Both fields are restricted onto `mask` before being subtracted, so the
    /// three grids must be nested.
    pub fn get_difference(&self, exact: &Field, mask: &Mesh, norm: Norm) -> Result<f64, Error> {
        let field = self.restriction(mask)?;
        let exact = exact.restriction(mask)?;

        let label = format!("{}-error", self.label());
        let difference = field.subtract(&exact, Some(&label))?;

        difference.norm(norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{sampled, stations};

    fn field() -> Field {
        let x = stations(0.0, 1.0, 6);
        let y = stations(-1.0, 1.0, 6);
        sampled(&x, &y, "vorticity", |x, y| (3.0 * x).sin() * y)
    }

    #[test]
    fn norms_of_known_values() {
        let mesh = Mesh::new(vec![0.0, 1.0], vec![0.0, 1.0]);
        let values = ndarray::arr2(&[[3.0, -4.0], [0.0, 0.0]]).into_dyn();
        let field = Field::new(mesh, values, 0, "pressure").unwrap();

        assert_eq!(field.norm(Norm::L2).unwrap(), 5.0);
        assert_eq!(field.norm(Norm::Linf).unwrap(), 4.0);
    }

    #[test]
    fn difference_with_itself_vanishes() {
        let f = field();
        let mask = Mesh::new(stations(0.0, 1.0, 3), stations(-1.0, 1.0, 2));

        assert_eq!(f.get_difference(&f, &mask, Norm::L2).unwrap(), 0.0);
        assert_eq!(f.get_difference(&f, &mask, Norm::Linf).unwrap(), 0.0);
    }

    #[test]
    fn difference_is_measured_on_the_mask() {
        let x = stations(0.0, 1.0, 4);
        let y = stations(0.0, 1.0, 4);
        let a = sampled(&x, &y, "pressure", |x, _| x);
        let b = sampled(&x, &y, "pressure", |_, _| 0.0);

        let mask = Mesh::new(vec![0.0, 1.0], vec![0.5]);
        assert_eq!(a.get_difference(&b, &mask, Norm::Linf).unwrap(), 1.0);
        assert_eq!(a.get_difference(&b, &mask, Norm::L2).unwrap(), 1.0);
    }

    #[test]
    fn undefined_nodes_are_never_skipped() {
        let mesh = Mesh::new(vec![0.0, 1.0], vec![0.0]);
        let values = ndarray::arr2(&[[1.0, f64::NAN]]).into_dyn();
        let field = Field::new(mesh, values, 0, "pressure").unwrap();

        match field.norm(Norm::L2) {
            Err(Error::UndefinedValues(e)) => assert_eq!(e.count, 1),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn norm_names_parse() {
        assert_eq!("L2".parse::<Norm>().unwrap(), Norm::L2);
        assert_eq!("linf".parse::<Norm>().unwrap(), Norm::Linf);
        assert_eq!(Norm::Linf.to_string(), "Linf");
        assert!("L1".parse::<Norm>().is_err());
    }
}
