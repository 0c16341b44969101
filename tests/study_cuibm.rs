use approx::assert_abs_diff_eq;
use gridconv::{FieldName, GridConvergenceStudy, StudyConfig};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// write a cuIBM case on the unit square with `n` cells per direction and a
/// pressure of `2 + x + y + C h^2` at time-step 100
fn write_case(directory: &Path, n: usize) {
    let h = 1.0 / n as f64;
    let stations: Vec<f64> = (0..=n).map(|i| h * i as f64).collect();
    let centres: Vec<f64> = stations.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();

    let mut grid = String::new();
    for _ in 0..2 {
        writeln!(grid, "{n}").unwrap();
        for s in &stations {
            writeln!(grid, "{s}").unwrap();
        }
    }

    let mut lambda = format!("{}\n", n * n);
    for y in &centres {
        for x in &centres {
            writeln!(lambda, "{}", 2.0 + x + y + 0.4 * h * h).unwrap();
        }
    }

    fs::create_dir_all(directory.join("0000100")).unwrap();
    fs::write(directory.join("grid"), grid).unwrap();
    fs::write(directory.join("0000100").join("lambda"), lambda).unwrap();
}

fn config(runs: &Path, output: &Path, solver: &str, exact: &str) -> StudyConfig {
    let yaml = format!(
        r#"
directory: {}
solver:
{solver}
cases: ["5", "15", "45"]
time_step: 100
field_names: [pressure]
norms: [l2, linf]
exact:
{exact}
save_name: cavity
output:
  directory: {}
  encoding: base64
  precision: float32
  vtk: true
"#,
        runs.display(),
        output.display()
    );

    StudyConfig::from_yaml_str(&yaml).unwrap()
}

#[test]
fn second_order_pressure_from_disk() {
    let runs = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    for n in [5, 15, 45] {
        write_case(&runs.path().join(n.to_string()), n);
    }

    let config = config(runs.path(), output.path(), "  name: cuibm", "  kind: finest");
    let mut study = GridConvergenceStudy::from_config(config).unwrap();
    let summary = study.run().unwrap();

    assert!(summary.failures.is_empty());
    assert_abs_diff_eq!(summary.order(FieldName::Pressure).unwrap(), 2.0, epsilon = 1e-6);

    // two coarse cases against the finest, in two norms
    assert_eq!(summary.errors.len(), 4);
    let coarse_linf = summary
        .errors
        .iter()
        .find(|e| e.description == "5" && e.norm == gridconv::Norm::Linf)
        .unwrap();
    assert_abs_diff_eq!(coarse_linf.grid_spacing, 0.2, epsilon = 1e-12);
    assert_abs_diff_eq!(coarse_linf.error, 0.4 * (0.04 - 1.0 / 2025.0), epsilon = 1e-9);

    let report = fs::read_to_string(output.path().join("cavity_5_15_45_0000100.dat")).unwrap();
    assert!(report.starts_with("pressure: 1.99") || report.starts_with("pressure: 2"));

    let vtk_path = output.path().join("asymptotic-range-pressure_0000100.vtr");
    let vtk = fs::read_to_string(vtk_path).unwrap();
    assert!(vtk.contains("RectilinearGrid"));
    assert!(vtk.contains("format=\"binary\""));
    assert!(vtk.contains("type=\"Float32\""));
}

#[test]
fn analytical_solution_matches_every_case() {
    let runs = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    for n in [5, 15, 45] {
        write_case(&runs.path().join(n.to_string()), n);
    }

    let config = config(
        runs.path(),
        output.path(),
        "  name: moving-vortices\n  time: 0.0",
        "  kind: moving-vortices\n  time: 0.0",
    );
    let mut study = GridConvergenceStudy::from_config(config).unwrap();
    let summary = study.run().unwrap();

    // every case samples the exact solution
    assert_eq!(summary.errors.len(), 6);
    for sample in &summary.errors {
        assert_abs_diff_eq!(sample.error, 0.0, epsilon = 1e-12);
    }

    // the cases only differ by round-off, so the order itself carries no meaning
    assert_eq!(summary.orders.len() + summary.failures.len(), 1);
}

#[test]
fn missing_case_directory_aborts_the_study() {
    let runs = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_case(&runs.path().join("5"), 5);
    write_case(&runs.path().join("15"), 15);

    let config = config(runs.path(), output.path(), "  name: cuibm", "  kind: finest");
    let mut study = GridConvergenceStudy::from_config(config).unwrap();

    assert!(matches!(study.run(), Err(gridconv::Error::Io(_))));
}
