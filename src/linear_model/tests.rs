use super::*;

fn line_data() -> (Matrix<f64>, Vector<f64>) {
    // y = 2x + 1
    let x = Matrix::from_vec(5, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0])
        .expect("Valid matrix dimensions for test");
    let y = Vector::from_slice(&[3.0, 5.0, 7.0, 9.0, 11.0]);
    (x, y)
}

fn two_feature_data() -> (Matrix<f64>, Vector<f64>) {
    // y = 1 + 2*x1 + 3*x2
    let x = Matrix::from_vec(
        6,
        2,
        vec![1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0],
    )
    .expect("Valid matrix dimensions for test");
    let y = Vector::from_slice(&[6.0, 8.0, 9.0, 11.0, 16.0, 21.0]);
    (x, y)
}

#[test]
fn test_ols_simple_line() {
    let (x, y) = line_data();
    let mut model = LinearRegression::new();
    model.fit(&x, &y).expect("Fit should succeed");

    let coef = model.coefficients().expect("fitted");
    assert!((coef[0] - 2.0).abs() < 1e-9);
    assert!((model.intercept() - 1.0).abs() < 1e-9);
    assert!((model.score(&x, &y).expect("score") - 1.0).abs() < 1e-12);
}

#[test]
fn test_ols_multivariate_recovers_coefficients() {
    let (x, y) = two_feature_data();
    let mut model = LinearRegression::new();
    model.fit(&x, &y).expect("Fit should succeed");

    let coef = model.coefficients().expect("fitted");
    assert!((coef[0] - 2.0).abs() < 1e-8);
    assert!((coef[1] - 3.0).abs() < 1e-8);
    assert!((model.intercept() - 1.0).abs() < 1e-8);
}

#[test]
fn test_ols_no_intercept() {
    let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).expect("Valid matrix");
    let y = Vector::from_slice(&[2.0, 4.0, 6.0, 8.0]);

    let mut model = LinearRegression::new().with_intercept(false);
    model.fit(&x, &y).expect("Fit should succeed");

    assert_eq!(model.intercept(), 0.0);
    assert!((model.coefficients().expect("fitted")[0] - 2.0).abs() < 1e-9);
}

#[test]
fn test_ols_underdetermined_is_insufficient() {
    let x = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).expect("Valid matrix");
    let y = Vector::from_slice(&[1.0, 2.0]);

    let mut model = LinearRegression::new();
    let err = model.fit(&x, &y).expect_err("3 parameters from 2 rows");
    assert!(err.is_insufficient_data());
}

#[test]
fn test_ols_collinear_is_insufficient() {
    // Second column is twice the first
    let x = Matrix::from_vec(4, 2, vec![1.0, 2.0, 2.0, 4.0, 3.0, 6.0, 4.0, 8.0])
        .expect("Valid matrix");
    let y = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]);

    let mut model = LinearRegression::new();
    let err = model.fit(&x, &y).expect_err("singular normal equations");
    assert!(err.is_insufficient_data());
}

#[test]
fn test_ols_dimension_mismatch() {
    let x = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("Valid matrix");
    let y = Vector::from_slice(&[1.0, 2.0]);

    let mut model = LinearRegression::new();
    assert!(matches!(
        model.fit(&x, &y),
        Err(AqError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_predict_before_fit() {
    let (x, _) = line_data();
    assert!(matches!(
        LinearRegression::new().predict(&x),
        Err(AqError::NotFitted)
    ));
    assert!(matches!(Ridge::new(1.0).predict(&x), Err(AqError::NotFitted)));
    assert!(matches!(Lasso::new(0.1).predict(&x), Err(AqError::NotFitted)));
}

#[test]
fn test_predict_wrong_width() {
    let (x, y) = line_data();
    let mut model = LinearRegression::new();
    model.fit(&x, &y).expect("Fit should succeed");

    let wide = Matrix::from_vec(1, 2, vec![1.0, 2.0]).expect("Valid matrix");
    assert!(model.predict(&wide).is_err());
}

#[test]
fn test_ridge_zero_alpha_matches_ols() {
    let (x, y) = two_feature_data();
    let mut ols = LinearRegression::new();
    let mut ridge = Ridge::new(0.0);
    ols.fit(&x, &y).expect("ols");
    ridge.fit(&x, &y).expect("ridge");

    let a = ols.coefficients().expect("fitted");
    let b = ridge.coefficients().expect("fitted");
    for j in 0..2 {
        assert!((a[j] - b[j]).abs() < 1e-8);
    }
}

#[test]
fn test_ridge_shrinks_coefficients() {
    let (x, y) = two_feature_data();
    let mut weak = Ridge::new(0.01);
    let mut strong = Ridge::new(100.0);
    weak.fit(&x, &y).expect("fit");
    strong.fit(&x, &y).expect("fit");

    let norm = |m: &Ridge| {
        let c = m.coefficients().expect("fitted");
        c.dot(c)
    };
    assert!(norm(&strong) < norm(&weak));
}

#[test]
fn test_ridge_does_not_penalize_intercept() {
    // Constant shift of y must move only the intercept
    let (x, y) = line_data();
    let shifted = y.add_scalar(100.0);

    let mut a = Ridge::new(5.0);
    let mut b = Ridge::new(5.0);
    a.fit(&x, &y).expect("fit");
    b.fit(&x, &shifted).expect("fit");

    let ca = a.coefficients().expect("fitted")[0];
    let cb = b.coefficients().expect("fitted")[0];
    assert!((ca - cb).abs() < 1e-9);
    assert!((b.intercept() - a.intercept() - 100.0).abs() < 1e-9);
}

#[test]
fn test_ridge_negative_alpha_rejected() {
    let (x, y) = line_data();
    let mut model = Ridge::new(-1.0);
    assert!(matches!(
        model.fit(&x, &y),
        Err(AqError::InvalidHyperparameter { .. })
    ));
}

#[test]
fn test_lasso_small_alpha_fits_well() {
    let (x, y) = two_feature_data();
    let mut model = Lasso::new(0.001).with_max_iter(10_000).with_tol(1e-8);
    model.fit(&x, &y).expect("Fit should succeed");

    let r2 = model.score(&x, &y).expect("score");
    assert!(r2 > 0.99, "R² should be > 0.99, got {r2}");
}

#[test]
fn test_lasso_large_alpha_zeroes_everything() {
    let (x, y) = two_feature_data();
    let mut model = Lasso::new(1e6);
    model.fit(&x, &y).expect("Fit should succeed");

    let coef = model.coefficients().expect("fitted");
    assert!(coef.iter().all(|c| c == 0.0));
    // With all slopes at zero the intercept is the target mean
    assert!((model.intercept() - y.mean()).abs() < 1e-12);
}

#[test]
fn test_lasso_drops_irrelevant_feature() {
    // Second column is noise uncorrelated with y
    let x = Matrix::from_vec(
        6,
        2,
        vec![1.0, 1.0, 2.0, -1.0, 3.0, 1.0, 4.0, -1.0, 5.0, 1.0, 6.0, -1.0],
    )
    .expect("Valid matrix");
    let y = Vector::from_slice(&[2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);

    let mut model = Lasso::new(0.5);
    model.fit(&x, &y).expect("Fit should succeed");

    let coef = model.coefficients().expect("fitted");
    assert!(coef[0] > 1.0);
    assert_eq!(coef[1], 0.0);
}

#[test]
fn test_lasso_soft_threshold() {
    assert_eq!(Lasso::soft_threshold(5.0, 2.0), 3.0);
    assert_eq!(Lasso::soft_threshold(-5.0, 2.0), -3.0);
    assert_eq!(Lasso::soft_threshold(1.5, 2.0), 0.0);
}

#[test]
fn test_lasso_zero_max_iter_rejected() {
    let (x, y) = line_data();
    let mut model = Lasso::new(0.1).with_max_iter(0);
    assert!(matches!(
        model.fit(&x, &y),
        Err(AqError::InvalidHyperparameter { .. })
    ));
}

#[test]
fn test_lasso_empty_data_error() {
    let x = Matrix::from_vec(0, 2, vec![]).expect("Valid matrix dimensions for test");
    let y = Vector::from_vec(vec![]);

    let mut model = Lasso::new(1.0);
    assert!(model.fit(&x, &y).is_err());
}

#[test]
fn test_ols_all_zero_column_gets_zero_coefficient() {
    // Second column never switches on (an indicator whose rows were masked out)
    let x = Matrix::from_vec(4, 2, vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 4.0, 0.0])
        .expect("Valid matrix");
    let y = Vector::from_slice(&[3.0, 5.0, 7.0, 9.0]);

    let mut model = LinearRegression::new();
    model.fit(&x, &y).expect("zero column is skipped, not singular");

    let coef = model.coefficients().expect("fitted");
    assert_eq!(coef.len(), 2);
    assert!((coef[0] - 2.0).abs() < 1e-9);
    assert_eq!(coef[1], 0.0);
    assert!((model.intercept() - 1.0).abs() < 1e-9);
}

#[test]
fn test_ols_mixed_scale_columns() {
    // Second column is a count around 5e6; y = 10 + 0.5*x1 + 2e-5*x2
    let mut data = Vec::new();
    let mut targets = Vec::new();
    for i in 0..12 {
        let x1 = f64::from(i) * 5.0;
        let x2 = 5.0e6 + 1.0e4 * f64::from((i * 7) % 12);
        data.extend([x1, x2]);
        targets.push(10.0 + 0.5 * x1 + 2.0e-5 * x2);
    }
    let x = Matrix::from_vec(12, 2, data).expect("Valid matrix");
    let y = Vector::from_vec(targets);

    let mut ols = LinearRegression::new();
    ols.fit(&x, &y).expect("well-posed despite scale gap");
    let coef = ols.coefficients().expect("fitted");
    assert!((coef[0] - 0.5).abs() < 1e-8);
    assert!((coef[1] - 2.0e-5).abs() < 1e-12);
    assert!((ols.intercept() - 10.0).abs() < 1e-5);

    let mut ridge = Ridge::new(0.0);
    ridge.fit(&x, &y).expect("zero alpha is plain OLS");
    assert!((ridge.coefficients().expect("fitted")[1] - 2.0e-5).abs() < 1e-12);
}
