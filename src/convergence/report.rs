use super::GridTriple;
use crate::prelude::*;
use std::fmt;
use std::fs;

/// Observed orders of convergence of one grid triple, as persisted on disk
///
/// The text form has one line per quantity, `"<field-name>: <order>"`, in the
/// order the orders were pushed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReport {
    pub save_name: String,
    pub coarse: String,
    pub medium: String,
    pub fine: String,
    pub time_step: u32,
    pub orders: Vec<(FieldName, f64)>,
}

impl OrderReport {
    pub fn new<T: Into<String>>(save_name: T, triple: &GridTriple, time_step: u32) -> Self {
        Self {
            save_name: save_name.into(),
            coarse: triple.coarse.description().to_string(),
            medium: triple.medium.description().to_string(),
            fine: triple.fine.description().to_string(),
            time_step,
            orders: Vec::new(),
        }
    }

    pub fn push(&mut self, name: FieldName, order: f64) {
        self.orders.push((name, order));
    }

    /// `<save_name>_<coarse>_<medium>_<fine>_<time_step:07>.dat`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}_{:07}.dat",
            self.save_name, self.coarse, self.medium, self.fine, self.time_step
        )
    }
}

impl fmt::Display for OrderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, order) in &self.orders {
            writeln!(f, "{name}: {order}")?;
        }
        Ok(())
    }
}

/// Writes order reports as text files into one directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    directory: PathBuf,
}

impl ReportWriter {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write `report` under [`OrderReport::file_name`], creating the directory
    /// if needed, and return the path of the file.
    pub fn write(&self, report: &OrderReport) -> Result<PathBuf, Error> {
        fs::create_dir_all(&self.directory)?;

        let path = self.directory.join(report.file_name());
        let mut file = fs::File::create(&path)?;
        write!(file, "{report}")?;

        log::info!(
            "wrote the orders of {} field(s) to {}",
            report.orders.len(),
            path.display()
        );

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> OrderReport {
        OrderReport {
            save_name: "orders".into(),
            coarse: "5".into(),
            medium: "15".into(),
            fine: "45".into(),
            time_step: 500,
            orders: vec![(FieldName::XVelocity, 1.5), (FieldName::Pressure, 2.0)],
        }
    }

    #[test]
    fn one_line_per_field() {
        assert_eq!(report().to_string(), "x-velocity: 1.5\npressure: 2\n");
    }

    #[test]
    fn file_name_carries_the_grids() {
        assert_eq!(report().file_name(), "orders_5_15_45_0000500.dat");
    }

    #[test]
    fn written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("reports"));

        let path = writer.write(&report()).unwrap();

        assert_eq!(path, dir.path().join("reports/orders_5_15_45_0000500.dat"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), report().to_string());
    }
}
