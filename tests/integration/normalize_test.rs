use sss_compare::transform::{classify, display_label, melt};
use sss_compare::{
    AdjustmentFactors, CpiRecord, CpiTable, LineGroup, ReportTable, Selection, SortKey, SourceSpec,
    load_standards, normalize,
};

use crate::utils::{OTHER_COSTS, michigan_rows, write_sheet};

const COST_COLUMNS: [&str; 14] = [
    "housing_costs",
    "child_care_costs",
    "food_costs",
    "transportation_costs",
    "health_care_costs",
    "miscellaneous_costs",
    "taxes",
    "earned_income_tax_credit",
    "child_care_tax_credit",
    "child_tax_credit",
    "hourly_self_sufficiency_wage",
    "monthly_self_sufficiency_wage",
    "annual_self_sufficiency_wage",
    "emergency_savings",
];

fn cpi(series: &[(i32, f64)], reference: f64) -> CpiTable {
    CpiTable::from_records(
        series.iter().map(|&(year, cpi)| CpiRecord { year, cpi }),
        reference,
    )
    .unwrap()
}

fn selection() -> Selection {
    Selection::new(
        ["Wayne County", "Marquette County"],
        ["a1i0p0s0t0", "a2i1p1s0t0"],
    )
}

#[test]
fn test_earlier_years_are_restated_in_reference_dollars() {
    let dir = tempfile::tempdir().unwrap();
    let raw = load_standards(&[
        SourceSpec::new(write_sheet(dir.path(), "mi2017.csv", &michigan_rows(1000.0)), 2017),
        SourceSpec::new(write_sheet(dir.path(), "mi2020.csv", &michigan_rows(1000.0)), 2020),
    ])
    .unwrap();

    let cpi = cpi(&[(2017, 245.0), (2020, 385.0)], 385.0);
    let factors = AdjustmentFactors::compute(&cpi, &raw.years().unwrap(), 2020).unwrap();
    let normalized = normalize(&raw, &selection(), &factors, SortKey::default()).unwrap();

    let table = &normalized.table;
    assert_eq!(table.years(), &[2017, 2020]);

    let housing = table
        .rows()
        .iter()
        .find(|r| r.county == "Wayne County" && r.family_code == "a1i0p0s0t0" && r.line_item == "Housing")
        .unwrap();
    assert!((table.value(housing, 2017).unwrap() - 1571.428_571).abs() < 1e-3);
    assert_eq!(table.value(housing, 2020), Some(1000.0));

    // Credits keep their sign after adjustment
    let credit = table
        .rows()
        .iter()
        .find(|r| r.county == "Wayne County" && r.line_item == "Child Tax Credit")
        .unwrap();
    assert!(table.value(credit, 2017).unwrap() < 0.0);
    assert_eq!(credit.line_group, LineGroup::MinimumIncome);
}

#[test]
fn test_unselected_county_never_reaches_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let raw = load_standards(&[SourceSpec::new(
        write_sheet(dir.path(), "mi2023.csv", &michigan_rows(1100.0)),
        2023,
    )])
    .unwrap();

    let cpi = cpi(&[(2023, 304.7)], 304.7);
    let factors = AdjustmentFactors::compute(&cpi, &[2023], 2023).unwrap();
    let normalized = normalize(&raw, &selection(), &factors, SortKey::County).unwrap();

    assert!(normalized.line_items.iter().all(|r| r.county != "Oakland County"));
    assert!(normalized.table.rows().iter().all(|r| r.county != "Oakland County"));
    // Two counties, two family types, fourteen lines each
    assert_eq!(normalized.table.rows().len(), 2 * 2 * 14);
    // Two Adults (no children) is not selected
    assert!(normalized.line_items.iter().all(|r| r.family_code != "a2i0p0s0t0"));
}

#[test]
fn test_child_care_costs_column_becomes_child_care_in_costs() {
    let dir = tempfile::tempdir().unwrap();
    let raw = load_standards(&[SourceSpec::new(
        write_sheet(dir.path(), "mi2023.csv", &michigan_rows(1100.0)),
        2023,
    )])
    .unwrap();

    let records = classify(melt(raw.batch()).unwrap());
    let child_care: Vec<_> = records.iter().filter(|r| r.line_item == "Child Care").collect();

    assert_eq!(child_care.len(), 6);
    assert!(child_care.iter().all(|r| r.line_group == LineGroup::Costs));
    assert!(child_care.iter().all(|r| (r.cost - 500.0).abs() < f64::EPSILON));
    assert!(records.iter().any(|r| r.family_type == "Two Adults, Infant & Preschooler"));
}

#[test]
fn test_reference_year_pivot_reproduces_raw_values() {
    let dir = tempfile::tempdir().unwrap();
    let raw = load_standards(&[SourceSpec::new(
        write_sheet(dir.path(), "mi2023.csv", &michigan_rows(1234.5)),
        2023,
    )])
    .unwrap();

    let cpi = cpi(&[(2023, 304.7)], 304.7);
    let factors = AdjustmentFactors::compute(&cpi, &[2023], 2023).unwrap();
    let everyone = Selection::new(
        ["Wayne County", "Marquette County", "Oakland County"],
        ["a1i0p0s0t0", "a2i1p1s0t0", "a2i0p0s0t0"],
    );
    let normalized = normalize(&raw, &everyone, &factors, SortKey::default()).unwrap();
    let table = &normalized.table;

    let expected: Vec<f64> = std::iter::once(1234.5).chain(OTHER_COSTS).collect();
    for (county, family) in [
        ("Wayne County", "a1i0p0s0t0"),
        ("Oakland County", "a1i0p0s0t0"),
        ("Wayne County", "a2i0p0s0t0"),
    ] {
        for (column, value) in COST_COLUMNS.iter().zip(&expected) {
            let label = display_label(column);
            let row = table
                .rows()
                .iter()
                .find(|r| r.county == county && r.family_code == family && r.line_item == label)
                .unwrap_or_else(|| panic!("missing {county} {family} {label}"));
            assert_eq!(table.value(row, 2023), Some(*value), "{county} {family} {label}");
        }
    }

    // Long form of the pivot carries the same cells as the line items
    let mut long = table.to_long();
    let mut items = normalized.line_items.clone();
    let key = |r: &sss_compare::LineItemRecord| (r.county.clone(), r.family_code.clone(), r.line_item.clone());
    long.sort_by_key(key);
    items.sort_by_key(key);
    assert_eq!(long, items);
}

#[test]
fn test_empty_selection_yields_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let raw = load_standards(&[SourceSpec::new(
        write_sheet(dir.path(), "mi2023.csv", &michigan_rows(1100.0)),
        2023,
    )])
    .unwrap();

    let cpi = cpi(&[(2023, 304.7)], 304.7);
    let factors = AdjustmentFactors::compute(&cpi, &[2023], 2023).unwrap();
    let normalized = normalize(&raw, &Selection::default(), &factors, SortKey::default()).unwrap();

    assert!(normalized.line_items.is_empty());
    assert!(normalized.table.is_empty());
    assert_eq!(normalized.table, ReportTable::pivot(&[], SortKey::default()));
}
