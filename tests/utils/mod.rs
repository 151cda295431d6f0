use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use sss_compare::{FamilyComposition, RecordBatch};

/// Header row as published, before column-name normalization
pub const BY_FAMILY_HEADER: &str = "Family_type,A,I,P,S,T,State,State FIPS,County FIPS,County,\
Housing Costs,Child Care Costs,Food Costs,Transportation Costs,Health Care Costs,\
Miscellaneous Costs,Taxes,Earned Income Tax Credit (-),Child Care Tax Credit (-),\
Child Tax Credit (-),Hourly Self-Sufficiency Wage,Monthly Self-Sufficiency Wage,\
Annual Self-Sufficiency Wage,Emergency Savings";

/// Cost block values after housing, in sheet order
pub const OTHER_COSTS: [f64; 13] = [
    500.0, 300.0, 200.0, 150.0, 100.0, 250.0, -40.0, -20.0, -80.0, 15.5, 2728.0, 32736.0, 60.0,
];

/// One sheet row: family type code, county, housing cost
pub type SheetRow<'a> = (&'a str, &'a str, f64);

fn county_fips(county: &str) -> u32 {
    match county {
        "Wayne County" => 163,
        "Marquette County" => 103,
        "Oakland County" => 125,
        _ => 1,
    }
}

/// Render one data line of a "by family" sheet
#[must_use]
pub fn sheet_line(family_type: &str, county: &str, housing: f64) -> String {
    let family = FamilyComposition::parse(family_type).unwrap_or_default();
    let costs: Vec<String> = std::iter::once(housing)
        .chain(OTHER_COSTS)
        .map(|v| v.to_string())
        .collect();

    format!(
        "{family_type},{},{},{},{},{},MI,26,{},{county},{}",
        family.adults,
        family.infants,
        family.preschoolers,
        family.school_agers,
        family.teenagers,
        county_fips(county),
        costs.join(",")
    )
}

/// Write a CSV "by family" sheet
pub fn write_sheet(dir: &Path, name: &str, rows: &[SheetRow<'_>]) -> PathBuf {
    write_sheet_with_header(dir, name, BY_FAMILY_HEADER, rows)
}

/// Write a CSV sheet with a custom header
pub fn write_sheet_with_header(dir: &Path, name: &str, header: &str, rows: &[SheetRow<'_>]) -> PathBuf {
    let mut content = String::from(header);
    content.push('\n');
    for (family_type, county, housing) in rows {
        content.push_str(&sheet_line(family_type, county, *housing));
        content.push('\n');
    }

    let path = dir.join(name);
    std::fs::write(&path, content).expect("write sheet");
    path
}

/// Write a `year,cpi` series
pub fn write_cpi(dir: &Path, series: &[(i32, f64)]) -> PathBuf {
    let mut content = String::from("year,cpi\n");
    for (year, cpi) in series {
        content.push_str(&format!("{year},{cpi}\n"));
    }

    let path = dir.join("cpi.csv");
    std::fs::write(&path, content).expect("write cpi");
    path
}

/// Build a "by family" sheet as an Arrow batch with integer composition
/// counts, as a Parquet export would store it
pub fn parquet_sheet_batch(rows: &[SheetRow<'_>]) -> RecordBatch {
    let headers: Vec<&str> = BY_FAMILY_HEADER.split(',').collect();
    let text_columns = [0usize, 6, 9];
    let count_columns = 1..=5;

    let mut fields = Vec::with_capacity(headers.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(headers.len());
    for (i, header) in headers.iter().enumerate() {
        let values: Vec<String> = rows
            .iter()
            .map(|(family_type, county, housing)| {
                sheet_line(family_type, county, *housing)
                    .split(',')
                    .nth(i)
                    .unwrap()
                    .to_string()
            })
            .collect();

        if text_columns.contains(&i) {
            fields.push(Field::new(*header, DataType::Utf8, true));
            arrays.push(Arc::new(StringArray::from(values)));
        } else if count_columns.contains(&i) {
            fields.push(Field::new(*header, DataType::Int64, true));
            arrays.push(Arc::new(Int64Array::from(
                values.iter().map(|v| v.parse::<i64>().unwrap()).collect::<Vec<_>>(),
            )));
        } else {
            fields.push(Field::new(*header, DataType::Float64, true));
            arrays.push(Arc::new(Float64Array::from(
                values.iter().map(|v| v.parse::<f64>().unwrap()).collect::<Vec<_>>(),
            )));
        }
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).expect("parquet batch")
}

/// Replace one column of a batch, keeping its header name
pub fn replace_column(batch: &RecordBatch, index: usize, array: ArrayRef) -> RecordBatch {
    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let name = fields[index].name().clone();
    fields[index] = Field::new(name, array.data_type().clone(), true);

    let mut arrays = batch.columns().to_vec();
    arrays[index] = array;
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).expect("replaced batch")
}

/// Write a batch as a Parquet file
pub fn write_parquet(dir: &Path, name: &str, batch: &RecordBatch) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("create parquet");
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).expect("parquet writer");
    writer.write(batch).expect("write parquet");
    writer.close().expect("close parquet");
    path
}

/// Write a Parquet "by family" sheet with integer composition counts
pub fn write_parquet_sheet(dir: &Path, name: &str, rows: &[SheetRow<'_>]) -> PathBuf {
    write_parquet(dir, name, &parquet_sheet_batch(rows))
}

/// Rows for the three Michigan counties used throughout the tests
#[must_use]
pub fn michigan_rows(housing: f64) -> Vec<SheetRow<'static>> {
    vec![
        ("a1i0p0s0t0", "Wayne County", housing),
        ("a2i1p1s0t0", "Wayne County", housing),
        ("a1i0p0s0t0", "Marquette County", housing),
        ("a2i1p1s0t0", "Marquette County", housing),
        ("a1i0p0s0t0", "Oakland County", housing),
        ("a2i0p0s0t0", "Wayne County", housing),
    ]
}
