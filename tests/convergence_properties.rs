use approx::assert_abs_diff_eq;
use gridconv::ndarray::Array2;
use gridconv::{
    asymptotic_range, grid_convergence_index, observed_order, Error, Field, Mesh, Norm,
    SafetyFactor,
};

/// `n_cells + 1` uniform stations on `[start, end]`
fn stations(start: f64, end: f64, n_cells: usize) -> Vec<f64> {
    let h = (end - start) / n_cells as f64;
    (0..=n_cells).map(|i| start + h * i as f64).collect()
}

fn sampled<F: Fn(f64, f64) -> f64>(x: &[f64], y: &[f64], f: F) -> Field {
    let values = Array2::from_shape_fn((y.len(), x.len()), |(j, i)| f(x[i], y[j]));
    Field::from_2d(x.to_vec(), y.to_vec(), values, 0, "pressure").unwrap()
}

/// `2 + x^2 + y + C h^2` on a uniform grid of the unit square with spacing `h`
fn quadratic(h: f64) -> Field {
    let n_cells = (1.0 / h).round() as usize;
    let x = stations(0.0, 1.0, n_cells);
    sampled(&x, &x, |x, y| 2.0 + x * x + y + 0.3 * h * h)
}

#[test]
fn restriction_is_idempotent() {
    let fine = quadratic(0.025);
    let grid = quadratic(0.1).mesh().clone();

    let once = fine.restriction(&grid).unwrap();
    let twice = once.restriction(&grid).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn restriction_lands_on_the_grid() {
    let fine = quadratic(0.025);
    let grid = quadratic(0.05).mesh().clone();

    let restricted = fine.restriction(&grid).unwrap();

    assert!(restricted.mesh().approx_eq(&grid, 1e-12));
    assert_eq!(fine.restriction(fine.mesh()).unwrap(), fine);
}

#[test]
fn subtracting_a_field_from_itself_gives_zero() {
    let field = quadratic(0.05);
    let difference = field.subtract(&field, None).unwrap();

    assert!(difference.iter().all(|v| v == Some(0.0)));
}

#[test]
fn difference_with_itself_has_zero_norm() {
    let field = quadratic(0.025);
    let mask = quadratic(0.1).mesh().clone();

    assert_eq!(field.get_difference(&field, &mask, Norm::L2).unwrap(), 0.0);
    assert_eq!(field.get_difference(&field, &mask, Norm::Linf).unwrap(), 0.0);
}

#[test]
fn recovers_a_known_order() {
    let p_true = 1.5_f64;
    let x = stations(0.0, 1.0, 4);
    let grid = Mesh::new(x.clone(), x.clone());

    // errors shrink by 2^p between consecutive grids
    let coarse_error = 0.08;
    let medium_error = coarse_error / 2f64.powf(p_true);
    let fine_error = medium_error / 2f64.powf(p_true);

    let fields: Vec<Field> = [(4, coarse_error), (8, medium_error), (16, fine_error)]
        .iter()
        .map(|&(n, e)| {
            let s = stations(0.0, 1.0, n);
            sampled(&s, &s, |x, y| (x * y).sin() + e)
        })
        .collect();

    let order =
        observed_order(&fields[0], &fields[1], &fields[2], 2.0, &grid, Norm::L2).unwrap();
    assert_abs_diff_eq!(order, p_true, epsilon = 1e-6);
}

#[test]
fn small_values_are_masked_out_of_the_gci() {
    let x = stations(0.0, 1.0, 2);
    let coarse = sampled(&x, &x, |x, y| if x == 0.0 && y == 0.0 { 0.0 } else { 1.0 + x + y });
    let fine = sampled(&x, &x, |x, y| 1.1 + x + y);

    let safety = SafetyFactor::ThreeGrids;
    let gci = grid_convergence_index(&coarse, &fine, 2.0, 2.0, coarse.mesh(), safety).unwrap();

    assert_eq!(gci.value(&[0, 0]), None);
    assert_eq!(gci.count_undefined(), 1);
    assert!(gci.iter().flatten().all(f64::is_finite));
}

#[test]
fn identical_medium_and_fine_is_degenerate() {
    let coarse = quadratic(0.1);
    let medium = quadratic(0.05);
    let fine = medium.restriction(coarse.mesh()).unwrap();

    match observed_order(&coarse, &medium, &fine, 2.0, coarse.mesh(), Norm::L2) {
        Err(Error::DegenerateConvergence(e)) => assert_eq!(e.label, "pressure"),
        other => panic!("expected a degenerate convergence, got {other:?}"),
    }
}

#[test]
fn quadratic_on_three_grids() {
    let coarse = quadratic(0.1);
    let medium = quadratic(0.05);
    let fine = quadratic(0.025);
    let grid = coarse.mesh().clone();

    let order = observed_order(&coarse, &medium, &fine, 2.0, &grid, Norm::L2).unwrap();
    assert_abs_diff_eq!(order, 2.0, epsilon = 1e-6);

    let linf = observed_order(&coarse, &medium, &fine, 2.0, &grid, Norm::Linf).unwrap();
    assert_abs_diff_eq!(linf, 2.0, epsilon = 1e-6);

    let range = asymptotic_range(&coarse, &medium, &fine, order, 2.0, &grid).unwrap();
    assert_eq!(range.shape(), &[11, 11]);
    for value in range.iter().flatten() {
        assert_abs_diff_eq!(value, 1.0, epsilon = 1e-2);
    }
}
