//! Reproducibility of seeded model fits.
//!
//! The random forest draws its bootstrap samples from a seeded generator,
//! so two fits with the same seed on the same data must agree exactly.

use aqfleet::prelude::*;

fn data() -> (Matrix<f64>, Vector<f64>) {
    let n = 40;
    let mut x = Vec::with_capacity(n * 2);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let af = i as f64 * 2.5;
        let indicator = if i % 2 == 0 { 0.0 } else { 1.0 };
        x.extend([af, indicator]);
        y.push(30.0 - 0.2 * af + 4.0 * indicator + ((i * 7) % 5) as f64);
    }
    (
        Matrix::from_vec(n, 2, x).expect("valid"),
        Vector::from_vec(y),
    )
}

#[test]
fn test_forest_refit_is_identical() {
    let (x, y) = data();
    let hp = Hyperparameters::default().with_n_estimators(25);

    let a = train(&x, &y, ModelKind::RandomForest, &hp).expect("fit");
    let b = train(&x, &y, ModelKind::RandomForest, &hp).expect("fit");

    let pa = a.predict(&x).expect("predict");
    let pb = b.predict(&x).expect("predict");
    assert_eq!(pa.as_slice(), pb.as_slice());
    assert_eq!(a.feature_importances(), b.feature_importances());
}

#[test]
fn test_forest_seed_changes_fit() {
    let (x, y) = data();
    let a = train(
        &x,
        &y,
        ModelKind::RandomForest,
        &Hyperparameters::default().with_n_estimators(25),
    )
    .expect("fit");
    let b = train(
        &x,
        &y,
        ModelKind::RandomForest,
        &Hyperparameters::default()
            .with_n_estimators(25)
            .with_random_seed(7),
    )
    .expect("fit");

    let pa = a.predict(&x).expect("predict");
    let pb = b.predict(&x).expect("predict");
    assert_ne!(pa.as_slice(), pb.as_slice());
}

#[test]
fn test_linear_refit_is_identical() {
    let (x, y) = data();
    for kind in [ModelKind::Ols, ModelKind::Ridge, ModelKind::Lasso] {
        let a = train(&x, &y, kind, &Hyperparameters::default()).expect("fit");
        let b = train(&x, &y, kind, &Hyperparameters::default()).expect("fit");
        assert_eq!(
            a.coefficients().expect("linear").as_slice(),
            b.coefficients().expect("linear").as_slice()
        );
        assert_eq!(a.intercept(), b.intercept());
    }
}
