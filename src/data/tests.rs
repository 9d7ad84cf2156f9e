use super::*;

fn csv_table(text: &str) -> Table {
    Table::from_csv_reader(text.as_bytes()).expect("valid csv")
}

#[test]
fn test_column_inference_numeric_with_nulls() {
    let col = Column::from_raw(vec!["1.5".into(), "".into(), " 3 ".into(), "NaN".into()]);
    assert_eq!(col, Column::Numeric(vec![Some(1.5), None, Some(3.0), None]));
}

#[test]
fn test_column_inference_text() {
    let col = Column::from_raw(vec!["AT".into(), "".into(), "12".into()]);
    assert!(!col.is_numeric());
    assert_eq!(col.text_at(0).as_deref(), Some("AT"));
    assert!(col.is_null(1));
    // Numeric-looking cells in a text column still parse on demand
    assert_eq!(col.numeric_at(2), Some(12.0));
    assert_eq!(col.numeric_at(0), None);
}

#[test]
fn test_all_empty_column_is_numeric_nulls() {
    let col = Column::from_raw(vec![String::new(), String::new()]);
    assert_eq!(col, Column::Numeric(vec![None, None]));
}

#[test]
fn test_numeric_text_form_drops_trailing_zero() {
    let col = Column::Numeric(vec![Some(2019.0), Some(0.25)]);
    assert_eq!(col.text_at(0).as_deref(), Some("2019"));
    assert_eq!(col.text_at(1).as_deref(), Some("0.25"));
}

#[test]
fn test_table_rejects_ragged_columns() {
    let result = Table::new(vec![
        ("a".into(), Column::Numeric(vec![Some(1.0)])),
        ("b".into(), Column::Numeric(vec![Some(1.0), Some(2.0)])),
    ]);
    assert!(matches!(result, Err(AqError::DimensionMismatch { .. })));
}

#[test]
fn test_table_rejects_duplicate_names() {
    let result = Table::new(vec![
        ("a".into(), Column::Numeric(vec![Some(1.0)])),
        ("a".into(), Column::Numeric(vec![Some(2.0)])),
    ]);
    assert!(result.is_err());
}

#[test]
fn test_missing_column_error() {
    let table = csv_table("a,b\n1,2\n");
    assert!(matches!(
        table.column("zzz"),
        Err(AqError::MissingColumn { .. })
    ));
}

#[test]
fn test_csv_reader_short_rows_and_header_trim() {
    let table = csv_table(" Country ,Year,Value\nAT,2019,1.0\nNO,2020\n");
    assert_eq!(table.shape(), (2, 3));
    assert_eq!(table.column_names(), vec!["Country", "Year", "Value"]);
    assert_eq!(table.numeric("Value").expect("exists"), vec![Some(1.0), None]);
}

#[test]
fn test_csv_reader_duplicate_headers_renamed() {
    let table = csv_table("x,x,x\n1,2,3\n");
    assert_eq!(table.column_names(), vec!["x", "x.1", "x.2"]);
}

#[test]
fn test_from_csv_path_missing_file() {
    let err = Table::from_csv_path("/definitely/not/here.csv").expect_err("missing");
    assert!(matches!(err, AqError::MissingSource { .. }));
}

#[test]
fn test_filter_eq_and_select_rows() {
    let table = csv_table("Pollutant,v\nPM10,1\nNO2,2\nPM10,3\n");
    let pm = table.filter_eq("Pollutant", "PM10").expect("exists");
    assert_eq!(pm.n_rows(), 2);
    assert_eq!(pm.numeric("v").expect("exists"), vec![Some(1.0), Some(3.0)]);

    let none = table.filter_eq("Pollutant", "O3").expect("exists");
    assert_eq!(none.n_rows(), 0);
}

#[test]
fn test_left_join_matches_numeric_and_float_years() {
    let aq = csv_table("Country,Year,AnnualAvg\nAT,2019,10\nNO,2019,20\nSE,2019,30\n");
    let veh = csv_table("Country,Year,AF_fleet\nAT,2019.0,1.5\nNO, 2019 ,40\nDK,2019,7\n");

    let joined = left_join(&aq, &veh, &["Country", "Year"]).expect("join");
    assert_eq!(joined.n_rows(), 3);
    assert_eq!(
        joined.numeric("AF_fleet").expect("exists"),
        vec![Some(1.5), Some(40.0), None]
    );
}

#[test]
fn test_left_join_suffixes_conflicting_columns() {
    let aq = csv_table("Country,Year,Source\nAT,2019,eea\n");
    let veh = csv_table("Country,Year,Source,AF_fleet\nAT,2019,eafo,2\n");

    let joined = left_join(&aq, &veh, &["Country", "Year"]).expect("join");
    assert_eq!(
        joined.column_names(),
        vec!["Country", "Year", "Source", "Source_vehicle", "AF_fleet"]
    );
    assert_eq!(
        joined.text("Source_vehicle").expect("exists"),
        vec![Some("eafo".to_string())]
    );
}

#[test]
fn test_left_join_first_duplicate_wins() {
    let aq = csv_table("Country,Year\nAT,2019\n");
    let veh = csv_table("Country,Year,AF_fleet\nAT,2019,1\nAT,2019,2\n");

    let joined = left_join(&aq, &veh, &["Country", "Year"]).expect("join");
    assert_eq!(joined.numeric("AF_fleet").expect("exists"), vec![Some(1.0)]);
}

#[test]
fn test_left_join_missing_key_column() {
    let aq = csv_table("Country,Year\nAT,2019\n");
    let veh = csv_table("Country,AF_fleet\nAT,1\n");
    assert!(matches!(
        left_join(&aq, &veh, &["Country", "Year"]),
        Err(AqError::MissingColumn { .. })
    ));
}
