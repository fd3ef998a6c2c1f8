//! Tests for data module

use super::*;
use crate::design::{DesignMatrix, add_constant};
use chrono::NaiveDate;

fn panel_frame() -> DataFrame {
    DataFrame::from_columns(vec![
        ("firm", Series::string(["b", "a", "b", "a", "c", "c"])),
        ("year", Series::int(vec![2001, 2002, 2000, 2000, 2000, 2001])),
        ("y", Series::float(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
    ])
    .unwrap()
}

#[test]
fn test_series_creation() {
    let float_series = Series::float(vec![1.0, 2.0, 3.0]);
    assert_eq!(float_series.len(), 3);
    assert_eq!(float_series.dtype(), "float64");

    let int_series = Series::int(vec![1, 2, 3]);
    assert_eq!(int_series.dtype(), "int64");

    let string_series = Series::string(["a", "b"]);
    assert_eq!(string_series.len(), 2);
    assert!(!string_series.is_numeric());

    let cat_series = Series::categorical(&["B", "A", "B", "C"]);
    assert_eq!(cat_series.len(), 4);
    assert_eq!(cat_series.dtype(), "categorical");
    assert_eq!(cat_series.get(0), Some(SeriesValue::String("B".to_string())));
    if let Series::Categorical(codes, cats) = &cat_series {
        assert_eq!(cats, &vec!["A".to_string(), "B".to_string(), "C".to_string()]);
        assert_eq!(codes.to_vec(), vec![1, 0, 1, 2]);
    } else {
        panic!("Expected Categorical series");
    }
}

#[test]
fn test_series_to_f64() {
    let ints = Series::int(vec![1, 2, 3]);
    assert_eq!(ints.to_f64().unwrap().to_vec(), vec![1.0, 2.0, 3.0]);

    let bools = Series::bool(vec![true, false]);
    assert_eq!(bools.to_f64().unwrap().to_vec(), vec![1.0, 0.0]);

    assert!(Series::string(["x"]).to_f64().is_none());
}

#[test]
fn test_series_missing_and_reorder() {
    let series = Series::float(vec![1.0, f64::NAN, 3.0]);
    assert!(!series.is_missing(0));
    assert!(series.is_missing(1));
    assert!(!series.is_missing(7));

    let reordered = series.reorder(&[2, 0]).unwrap();
    assert_eq!(reordered, Series::float(vec![3.0, 1.0]));

    let err = series.reorder(&[3]).unwrap_err();
    assert_eq!(err, DataError::IndexOutOfBounds { index: 3, len: 3 });
}

#[test]
fn test_datetime_display() {
    let ts = NaiveDate::from_ymd_opt(2020, 1, 31)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(SeriesValue::Datetime(ts).to_string(), "2020-01-31T00:00:00");
    assert_eq!(Series::datetime(vec![ts]).dtype(), "datetime64");
}

// ==================== DataFrame Tests ====================

#[test]
fn test_dataframe_creation() {
    let df = DataFrame::from_columns(vec![
        ("x", Series::float(vec![1.0, 2.0, 3.0])),
        ("y", Series::int(vec![4, 5, 6])),
    ])
    .unwrap();

    assert_eq!(df.shape(), (3, 2));
    assert_eq!(df.column_names(), vec!["x", "y"]);
}

#[test]
fn test_dataframe_select() {
    let df = DataFrame::from_columns(vec![
        ("a", Series::float(vec![1.0, 2.0, 3.0])),
        ("b", Series::float(vec![4.0, 5.0, 6.0])),
        ("c", Series::float(vec![7.0, 8.0, 9.0])),
    ])
    .unwrap();

    let selected = df.select(["a", "c"]).unwrap();
    assert_eq!(selected.shape(), (3, 2));
    assert_eq!(selected.column_names(), vec!["a", "c"]);
}

#[test]
fn test_dataframe_filter() {
    let df = DataFrame::from_columns(vec![
        ("x", Series::float(vec![1.0, 2.0, 3.0, 4.0, 5.0])),
        ("y", Series::int(vec![1, 2, 3, 4, 5])),
    ])
    .unwrap();

    let mask = vec![true, false, true, false, true];
    let filtered = df.filter(&mask).unwrap();

    assert_eq!(filtered.shape(), (3, 2));

    let x_col = filtered.get_column("x").unwrap();
    if let Series::Float(arr) = x_col {
        assert_eq!(arr.to_vec(), vec![1.0, 3.0, 5.0]);
    } else {
        panic!("Expected Float series");
    }
}

#[test]
fn test_column_not_found_lists_available() {
    let df = DataFrame::from_columns(vec![
        ("x", Series::float(vec![1.0])),
        ("y", Series::float(vec![2.0])),
    ])
    .unwrap();

    let err = df.require_columns(&["y", "z"]).unwrap_err();
    assert_eq!(
        err,
        DataError::ColumnNotFound {
            column: "z".to_string(),
            available: vec!["x".to_string(), "y".to_string()],
        }
    );
    let message = err.to_string();
    assert!(message.contains("'z'"));
    assert!(message.contains("\"x\""));
}

#[test]
fn test_column_f64_rejects_strings() {
    let df = DataFrame::from_columns(vec![("name", Series::string(["a", "b"]))]).unwrap();
    assert!(matches!(
        df.column_f64("name"),
        Err(DataError::NonNumericData { dtype: "string", .. })
    ));
}

#[test]
fn test_complete_rows() {
    let df = DataFrame::from_columns(vec![
        ("x", Series::float(vec![1.0, f64::NAN, 3.0])),
        ("y", Series::float(vec![f64::NAN, 2.0, 3.0])),
        ("z", Series::float(vec![f64::NAN, f64::NAN, f64::NAN])),
    ])
    .unwrap();

    assert_eq!(df.complete_rows(&["x"]).unwrap(), vec![true, false, true]);
    assert_eq!(df.complete_rows(&["x", "y"]).unwrap(), vec![false, false, true]);
}

#[test]
fn test_builder_pattern() {
    let df = DataFrameBuilder::new()
        .with_column("x", Series::float(vec![1.0, 2.0, 3.0]))
        .unwrap()
        .with_column("y", Series::int(vec![4, 5, 6]))
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(df.shape(), (3, 2));
}

#[test]
fn test_builder_rejects_bad_columns() {
    let result = DataFrameBuilder::new()
        .with_column("x", Series::float(vec![1.0, 2.0]))
        .unwrap()
        .with_column("y", Series::float(vec![1.0]));
    assert!(matches!(result, Err(DataError::DimensionMismatch { .. })));

    let result = DataFrameBuilder::new()
        .with_column("x", Series::float(vec![1.0]))
        .unwrap()
        .with_column("x", Series::float(vec![2.0]));
    assert_eq!(result.unwrap_err(), DataError::DuplicateColumn("x".to_string()));
}

// ==================== Panel Index Tests ====================

#[test]
fn test_panel_index_sorts_by_entity_then_time() {
    let df = panel_frame();
    let index = PanelIndex::new(&df, "firm", "year").unwrap();

    assert_eq!(index.n_entities(), 3);
    assert_eq!(index.n_periods(), 3);
    // a@2000, a@2002, b@2000, b@2001, c@2000, c@2001
    assert_eq!(index.order(), &[3, 1, 2, 0, 4, 5]);
    assert_eq!(index.entity_codes(), &[0, 0, 1, 1, 2, 2]);
    assert_eq!(index.time_codes(), &[0, 2, 0, 1, 0, 1]);
    assert_eq!(index.groups(), vec![0..2, 2..4, 4..6]);
    assert_eq!(index.entities()[0], IndexValue::String("a".to_string()));
}

#[test]
fn test_panel_index_rejects_duplicates() {
    let df = DataFrame::from_columns(vec![
        ("id", Series::int(vec![1, 1, 2])),
        ("t", Series::int(vec![5, 5, 5])),
    ])
    .unwrap();

    let err = PanelIndex::new(&df, "id", "t").unwrap_err();
    assert_eq!(
        err,
        DataError::DuplicateObservation {
            entity: "1".to_string(),
            time: "5".to_string(),
        }
    );
}

#[test]
fn test_panel_index_missing_column() {
    let df = panel_frame();
    assert!(matches!(
        PanelIndex::new(&df, "entity", "year"),
        Err(DataError::ColumnNotFound { .. })
    ));
}

#[test]
fn test_panel_index_missing_identifier() {
    let df = DataFrame::from_columns(vec![
        ("id", Series::float(vec![1.0, f64::NAN])),
        ("t", Series::int(vec![1, 2])),
    ])
    .unwrap();
    assert_eq!(
        PanelIndex::new(&df, "id", "t").unwrap_err(),
        DataError::MissingData("id".to_string())
    );
}

#[test]
fn test_index_value_ordering() {
    let mut values = vec![
        IndexValue::Float(2.5),
        IndexValue::Integer(3),
        IndexValue::Float(-1.0),
        IndexValue::Integer(1),
    ];
    values.sort();
    assert_eq!(
        values,
        vec![
            IndexValue::Integer(1),
            IndexValue::Integer(3),
            IndexValue::Float(-1.0),
            IndexValue::Float(2.5),
        ]
    );
}

// ==================== Design Matrix Tests ====================

#[test]
fn test_design_matrix_constant_first() {
    let df = DataFrame::from_columns(vec![
        ("y", Series::float(vec![1.0, 2.0, 3.0])),
        ("x1", Series::int(vec![4, 5, 6])),
        ("x2", Series::bool(vec![true, false, true])),
    ])
    .unwrap();

    let design = DesignMatrix::build(&df, "y", &["x1", "x2"], true).unwrap();
    assert_eq!(design.names, vec!["const", "x1", "x2"]);
    assert_eq!(design.x.shape(), &[3, 3]);
    assert_eq!(design.x[[0, 0]], 1.0);
    assert_eq!(design.x[[0, 1]], 4.0);
    assert_eq!(design.x[[1, 2]], 0.0);
    assert!(design.has_constant());
    assert_eq!(design.nobs(), 3);

    let picked = design.select_rows(&[2, 0]);
    assert_eq!(picked.y.to_vec(), vec![3.0, 1.0]);
    assert_eq!(picked.x[[0, 1]], 6.0);
}

#[test]
fn test_design_matrix_errors() {
    let df = DataFrame::from_columns(vec![
        ("y", Series::float(vec![1.0, f64::NAN])),
        ("x", Series::float(vec![1.0, 2.0])),
    ])
    .unwrap();

    assert_eq!(
        DesignMatrix::build(&df, "y", &["x"], true).unwrap_err(),
        DataError::MissingData("y".to_string())
    );
    assert!(matches!(
        DesignMatrix::build(&df, "y", &["w"], true),
        Err(DataError::ColumnNotFound { .. })
    ));
    let no_regressors: [&str; 0] = [];
    assert!(matches!(
        DesignMatrix::build(&df, "x", &no_regressors, false),
        Err(DataError::InvalidParameter(_))
    ));
}

#[test]
fn test_add_constant() {
    let x = ndarray::array![[2.0], [3.0]];
    let with_const = add_constant(&x);
    assert_eq!(with_const, ndarray::array![[1.0, 2.0], [1.0, 3.0]]);
}
