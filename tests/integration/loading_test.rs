use std::sync::Arc;

use arrow::array::{Array, StringArray};
use sss_compare::reader::{load_standards_with, read_source_with};
use sss_compare::schema::FieldKind;
use sss_compare::{SchemaDescriptor, SourceSpec, SssError, load_standards, read_source};

use crate::utils::{
    BY_FAMILY_HEADER, michigan_rows, parquet_sheet_batch, replace_column, write_parquet,
    write_parquet_sheet, write_sheet, write_sheet_with_header,
};

#[test]
fn test_union_tags_every_row_with_its_year() {
    let dir = tempfile::tempdir().unwrap();
    let sources = vec![
        SourceSpec::new(write_sheet(dir.path(), "mi2017.csv", &michigan_rows(1000.0)), 2017),
        SourceSpec::new(write_sheet(dir.path(), "mi2020.csv", &michigan_rows(1200.0)[..3]), 2020),
    ];

    let raw = load_standards(&sources).unwrap();

    assert_eq!(raw.num_rows(), 9);
    assert_eq!(raw.years().unwrap(), vec![2017, 2020]);
    // 24 sheet columns plus the year tag
    assert_eq!(raw.schema().fields().len(), 25);
    assert!(raw.schema().field_with_name("child_care_costs").is_ok());
}

#[test]
fn test_missing_column_is_a_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let header = BY_FAMILY_HEADER.trim_end_matches(",Emergency Savings");
    let path = dir.path().join("mi2017.csv");
    let rows: Vec<String> = michigan_rows(1000.0)
        .iter()
        .map(|(family, county, housing)| {
            let line = crate::utils::sheet_line(family, county, *housing);
            line.rsplit_once(',').unwrap().0.to_string()
        })
        .collect();
    std::fs::write(&path, format!("{header}\n{}\n", rows.join("\n"))).unwrap();

    let sources = vec![
        SourceSpec::new(&path, 2017),
        SourceSpec::new(write_sheet(dir.path(), "mi2020.csv", &michigan_rows(1200.0)), 2020),
    ];

    match load_standards(&sources) {
        Err(SssError::SchemaMismatch { source_name, year, detail }) => {
            assert!(source_name.contains("mi2017.csv"));
            assert_eq!(year, 2017);
            assert!(detail.contains("found 23"), "{detail}");
        }
        other => panic!("expected a schema mismatch, got {other:?}"),
    }
}

#[test]
fn test_renamed_column_is_a_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let header = BY_FAMILY_HEADER.replace("Food Costs", "Groceries");
    let path = write_sheet_with_header(dir.path(), "mi2020.csv", &header, &michigan_rows(1000.0));

    let err = read_source(&SourceSpec::new(path, 2020)).unwrap_err();
    assert!(matches!(err, SssError::SchemaMismatch { year: 2020, .. }), "{err}");
}

#[test]
fn test_non_numeric_cost_is_a_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mi2020.csv");
    let line = crate::utils::sheet_line("a1i0p0s0t0", "Wayne County", 1000.0)
        .replacen(",1000,", ",n/a,", 1);
    std::fs::write(&path, format!("{BY_FAMILY_HEADER}\n{line}\n")).unwrap();

    let err = read_source(&SourceSpec::new(path, 2020)).unwrap_err();
    assert!(matches!(err, SssError::SchemaMismatch { .. }), "{err}");
}

#[test]
fn test_non_numeric_parquet_cost_is_a_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let rows = michigan_rows(1000.0);
    let mut housing: Vec<String> = vec!["1000".to_string(); rows.len()];
    housing[0] = "$1,234".to_string();

    // Housing Costs is column 10 of the sheet
    let batch = replace_column(
        &parquet_sheet_batch(&rows),
        10,
        Arc::new(StringArray::from(housing)),
    );
    let path = write_parquet(dir.path(), "mi2020.parquet", &batch);

    match read_source(&SourceSpec::new(path, 2020)) {
        Err(SssError::SchemaMismatch { year, detail, .. }) => {
            assert_eq!(year, 2020);
            assert!(detail.contains("declared column types"), "{detail}");
        }
        other => panic!("expected a schema mismatch, got {other:?}"),
    }
}

#[test]
fn test_numeric_text_parquet_cost_is_coerced() {
    let dir = tempfile::tempdir().unwrap();
    let rows = michigan_rows(1000.0);
    let batch = replace_column(
        &parquet_sheet_batch(&rows),
        10,
        Arc::new(StringArray::from(vec!["1000.5"; rows.len()])),
    );
    let path = write_parquet(dir.path(), "mi2020.parquet", &batch);

    let loaded = read_source(&SourceSpec::new(path, 2020)).unwrap();
    let housing = loaded.column_by_name("housing_costs").unwrap();
    assert_eq!(housing.null_count(), 0);
}

#[test]
fn test_unknown_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut spec = SourceSpec::new(write_sheet(dir.path(), "mi2020.csv", &michigan_rows(1000.0)), 2020);
    spec.schema_version = "sss-by-county-v9".to_string();

    let err = read_source(&spec).unwrap_err();
    assert!(matches!(err, SssError::UnknownSchemaVersion(_)), "{err}");
}

#[test]
fn test_parquet_source_is_coerced_to_the_layout() {
    let dir = tempfile::tempdir().unwrap();
    let csv = SourceSpec::new(write_sheet(dir.path(), "mi2017.csv", &michigan_rows(1000.0)), 2017);
    let parquet = SourceSpec::new(
        write_parquet_sheet(dir.path(), "mi2020.parquet", &michigan_rows(1200.0)),
        2020,
    );

    let from_parquet = read_source(&parquet).unwrap();
    let from_csv = read_source(&csv).unwrap();
    assert_eq!(from_parquet.schema(), from_csv.schema());

    let raw = load_standards(&[csv, parquet]).unwrap();
    assert_eq!(raw.num_rows(), 12);
    assert_eq!(raw.years().unwrap(), vec![2017, 2020]);
}

#[test]
fn test_union_aligns_columns_by_name() {
    let first = SchemaDescriptor::new(
        "test-first",
        vec![
            ("family_type", FieldKind::Text),
            ("county", FieldKind::Text),
            ("housing_costs", FieldKind::Numeric),
            ("emergency_savings", FieldKind::Numeric),
        ],
    );
    let second = SchemaDescriptor::new(
        "test-second",
        vec![
            ("county", FieldKind::Text),
            ("family_type", FieldKind::Text),
            ("housing_costs", FieldKind::Numeric),
            ("emergency_savings", FieldKind::Numeric),
        ],
    );

    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    std::fs::write(&a, "Family_type,County,Housing Costs,Emergency Savings\na1i0p0s0t0,Wayne County,900,50\n").unwrap();
    std::fs::write(&b, "County,Family_type,Housing Costs,Emergency Savings\nWayne County,a1i0p0s0t0,950,55\n").unwrap();

    let sources = vec![SourceSpec::new(a, 2017), SourceSpec::new(b, 2020)];
    let raw = load_standards_with(&sources, |spec| {
        if spec.year == 2017 {
            read_source_with(spec, &first)
        } else {
            read_source_with(spec, &second)
        }
    })
    .unwrap();

    let schema = raw.schema();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, vec!["family_type", "county", "housing_costs", "emergency_savings", "year"]);
    assert_eq!(raw.num_rows(), 2);
}
