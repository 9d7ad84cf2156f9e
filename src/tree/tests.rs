use super::*;

fn step_data() -> (Matrix<f64>, Vector<f64>) {
    let x = Matrix::from_vec(6, 1, vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0])
        .expect("Matrix creation should succeed in tests");
    let y = Vector::from_slice(&[1.0, 1.0, 1.0, 5.0, 5.0, 5.0]);
    (x, y)
}

fn quadratic_data() -> (Matrix<f64>, Vector<f64>) {
    let x = Matrix::from_vec(8, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
        .expect("Matrix creation should succeed in tests");
    let y = Vector::from_slice(&[1.0, 4.0, 9.0, 16.0, 25.0, 36.0, 49.0, 64.0]);
    (x, y)
}

#[test]
fn test_regression_tree_creation() {
    let tree = DecisionTreeRegressor::new();
    assert!(tree.root().is_none());
    assert!(tree.max_depth.is_none());
    assert_eq!(tree.min_samples_split, 2);
    assert_eq!(tree.min_samples_leaf, 1);
}

#[test]
fn test_regression_tree_builder_clamps() {
    let tree = DecisionTreeRegressor::new()
        .with_min_samples_split(0)
        .with_min_samples_leaf(0);
    assert_eq!(tree.min_samples_split, 2);
    assert_eq!(tree.min_samples_leaf, 1);
}

#[test]
fn test_regression_tree_step_function_exact() {
    let (x, y) = step_data();
    let mut tree = DecisionTreeRegressor::new();
    tree.fit(&x, &y).expect("fit should succeed");

    let root = tree.root().expect("fitted");
    assert_eq!(root.depth(), 1);
    assert_eq!(tree.predict(&x).expect("predict").as_slice(), y.as_slice());
}

#[test]
fn test_regression_tree_max_depth_limits_complexity() {
    let (x, y) = quadratic_data();

    let mut shallow = DecisionTreeRegressor::new().with_max_depth(1);
    shallow.fit(&x, &y).expect("fit should succeed");
    let mut deep = DecisionTreeRegressor::new().with_max_depth(5);
    deep.fit(&x, &y).expect("fit should succeed");

    assert_eq!(shallow.root().expect("fitted").depth(), 1);
    assert!(deep.root().expect("fitted").depth() > 1);

    let r2_shallow = shallow.score(&x, &y).expect("score");
    let r2_deep = deep.score(&x, &y).expect("score");
    assert!(r2_deep > r2_shallow);
    assert!((r2_deep - 1.0).abs() < 1e-12);
}

#[test]
fn test_regression_tree_constant_target_is_single_leaf() {
    let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).expect("valid");
    let y = Vector::from_slice(&[7.0, 7.0, 7.0, 7.0]);

    let mut tree = DecisionTreeRegressor::new();
    tree.fit(&x, &y).expect("fit should succeed");
    assert_eq!(tree.root().expect("fitted").depth(), 0);
    assert!(tree
        .predict(&x)
        .expect("predict")
        .iter()
        .all(|p| (p - 7.0).abs() < 1e-12));
}

#[test]
fn test_regression_tree_predict_between_training_points() {
    let (x, y) = step_data();
    let mut tree = DecisionTreeRegressor::new();
    tree.fit(&x, &y).expect("fit should succeed");

    let probe = Matrix::from_vec(2, 1, vec![6.4, 6.6]).expect("valid");
    let out = tree.predict(&probe).expect("predict");
    // Threshold sits at the midpoint 6.5
    assert_eq!(out.as_slice(), &[1.0, 5.0]);
}

#[test]
fn test_regression_tree_errors() {
    let (x, y) = step_data();
    let tree = DecisionTreeRegressor::new();
    assert!(matches!(tree.predict(&x), Err(AqError::NotFitted)));

    let mut tree = DecisionTreeRegressor::new();
    let short = Vector::from_slice(&[1.0]);
    assert!(tree.fit(&x, &short).is_err());

    tree.fit(&x, &y).expect("fit");
    let wide = Matrix::from_vec(1, 2, vec![1.0, 2.0]).expect("valid");
    assert!(matches!(
        tree.predict(&wide),
        Err(AqError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_random_forest_regressor_creation() {
    let rf = RandomForestRegressor::new(25);
    assert_eq!(rf.n_estimators(), 25);
    assert!(rf.trees().is_empty());
    assert!(rf.feature_importances().is_none());
    assert_eq!(RandomForestRegressor::default().n_estimators(), 100);
}

#[test]
fn test_random_forest_regressor_fits_requested_trees() {
    let (x, y) = quadratic_data();
    let mut rf = RandomForestRegressor::new(12).with_random_state(42);
    rf.fit(&x, &y).expect("fit should succeed");
    assert_eq!(rf.trees().len(), 12);
}

#[test]
fn test_random_forest_regressor_good_training_fit() {
    let (x, y) = quadratic_data();
    let mut rf = RandomForestRegressor::new(50).with_random_state(42);
    rf.fit(&x, &y).expect("fit should succeed");

    let r2 = rf.score(&x, &y).expect("score");
    assert!(r2 > 0.8, "R² {r2} too low on training data");
}

#[test]
fn test_random_forest_regressor_random_state() {
    let (x, y) = quadratic_data();

    let mut a = RandomForestRegressor::new(20).with_random_state(7);
    let mut b = RandomForestRegressor::new(20).with_random_state(7);
    a.fit(&x, &y).expect("fit");
    b.fit(&x, &y).expect("fit");

    let probe = Matrix::from_vec(3, 1, vec![0.0, 4.5, 9.0]).expect("valid");
    assert_eq!(
        a.predict(&probe).expect("predict").as_slice(),
        b.predict(&probe).expect("predict").as_slice()
    );
}

#[test]
fn test_random_forest_regressor_predictions_within_target_range() {
    let (x, y) = quadratic_data();
    let mut rf = RandomForestRegressor::new(30).with_random_state(1);
    rf.fit(&x, &y).expect("fit");

    let probe = Matrix::from_vec(3, 1, vec![-100.0, 4.5, 100.0]).expect("valid");
    for p in rf.predict(&probe).expect("predict").iter() {
        assert!((1.0..=64.0).contains(&p));
    }
}

#[test]
fn test_random_forest_feature_importances_sum_to_one() {
    // Only the first feature carries signal
    let x = Matrix::from_vec(
        8,
        2,
        vec![
            1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 4.0, 0.0, 5.0, 0.0, 6.0, 0.0, 7.0, 0.0, 8.0, 0.0,
        ],
    )
    .expect("valid");
    let y = Vector::from_slice(&[1.0, 1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0]);

    let mut rf = RandomForestRegressor::new(10).with_random_state(3);
    rf.fit(&x, &y).expect("fit");

    let importances = rf.feature_importances().expect("fitted");
    assert_eq!(importances.len(), 2);
    let total: f64 = importances.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(importances[1], 0.0);
}

#[test]
fn test_random_forest_regressor_validation_errors() {
    let (x, y) = step_data();

    let mut rf = RandomForestRegressor::new(0);
    assert!(matches!(
        rf.fit(&x, &y),
        Err(AqError::InvalidHyperparameter { .. })
    ));

    let rf = RandomForestRegressor::new(5);
    assert!(matches!(rf.predict(&x), Err(AqError::NotFitted)));
}
