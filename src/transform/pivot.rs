//! Wide re-pivot of line items into a year-per-column report table

use std::cmp::Ordering;

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::groups::LineGroup;
use super::reshape::LineItemRecord;

/// Ordering applied to the report rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Family type label, Z to A
    #[default]
    FamilyTypeDescending,
    /// Family type label, A to Z
    FamilyTypeAscending,
    /// County, then family type label Z to A
    County,
    /// Line group in display order
    LineGroup,
}

/// One (county, family type, line item) row with a cost per year
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// County name
    pub county: String,
    /// Compact family-type code
    pub family_code: String,
    /// Decoded family-type label
    pub family_type: String,
    /// Display label of the line item
    pub line_item: String,
    /// Group of the line item
    pub line_group: LineGroup,
    /// Cost for each of the table's years, `None` where the year has no value
    pub costs: Vec<Option<f64>>,
}

/// Rows sharing a county and family type, in table order
#[derive(Debug, Clone)]
pub struct ReportGroup<'a> {
    /// County name
    pub county: &'a str,
    /// Decoded family-type label
    pub family_type: &'a str,
    /// Rows of the group
    pub rows: Vec<&'a ReportRow>,
}

/// Wide table, one column per reporting year
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    years: Vec<i32>,
    rows: Vec<ReportRow>,
}

type RowKey = (String, String, String, LineGroup);

impl ReportTable {
    /// Group records by (county, family type, line item, line group) and
    /// spread their years into columns.
    ///
    /// Rows keep the order in which their key first appears, then are
    /// stable-sorted by `sort`.
    #[must_use]
    pub fn pivot(records: &[LineItemRecord], sort: SortKey) -> Self {
        let years: Vec<i32> = records.iter().map(|r| r.year).sorted_unstable().dedup().collect();
        let year_slots: FxHashMap<i32, usize> =
            years.iter().enumerate().map(|(slot, year)| (*year, slot)).collect();

        let mut index: FxHashMap<RowKey, usize> = FxHashMap::default();
        let mut rows: Vec<ReportRow> = Vec::new();

        for record in records {
            let key = (
                record.county.clone(),
                record.family_type.clone(),
                record.line_item.clone(),
                record.line_group,
            );
            let row_idx = *index.entry(key).or_insert_with(|| {
                rows.push(ReportRow {
                    county: record.county.clone(),
                    family_code: record.family_code.clone(),
                    family_type: record.family_type.clone(),
                    line_item: record.line_item.clone(),
                    line_group: record.line_group,
                    costs: vec![None; years.len()],
                });
                rows.len() - 1
            });

            let slot = year_slots[&record.year];
            let cell = &mut rows[row_idx].costs[slot];
            if cell.is_some() {
                log::warn!(
                    "Duplicate {} value for {} / {} in {}; keeping the first",
                    record.line_item,
                    record.county,
                    record.family_type,
                    record.year
                );
            } else {
                *cell = Some(record.cost);
            }
        }

        let mut table = Self { years, rows };
        table.sort(sort);
        table
    }

    /// Stable-sort the rows
    pub fn sort(&mut self, key: SortKey) {
        let by_family_desc = |a: &ReportRow, b: &ReportRow| b.family_type.cmp(&a.family_type);
        match key {
            SortKey::FamilyTypeDescending => self.rows.sort_by(by_family_desc),
            SortKey::FamilyTypeAscending => {
                self.rows.sort_by(|a, b| a.family_type.cmp(&b.family_type));
            }
            SortKey::County => self.rows.sort_by(|a, b| match a.county.cmp(&b.county) {
                Ordering::Equal => by_family_desc(a, b),
                other => other,
            }),
            SortKey::LineGroup => self.rows.sort_by_key(|row| row.line_group),
        }
    }

    /// Reporting years, ascending
    #[must_use]
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Table rows
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cost in a row for a given year
    #[must_use]
    pub fn value(&self, row: &ReportRow, year: i32) -> Option<f64> {
        let slot = self.years.iter().position(|y| *y == year)?;
        row.costs.get(slot).copied().flatten()
    }

    /// Rows grouped by (county, family type) in order of first appearance
    #[must_use]
    pub fn groups(&self) -> Vec<ReportGroup<'_>> {
        let mut index: FxHashMap<(&str, &str), usize> = FxHashMap::default();
        let mut groups: Vec<ReportGroup<'_>> = Vec::new();

        for row in &self.rows {
            let key = (row.county.as_str(), row.family_type.as_str());
            let idx = *index.entry(key).or_insert_with(|| {
                groups.push(ReportGroup {
                    county: key.0,
                    family_type: key.1,
                    rows: Vec::new(),
                });
                groups.len() - 1
            });
            groups[idx].rows.push(row);
        }

        groups
    }

    /// Unpivot back into long records, skipping empty cells
    #[must_use]
    pub fn to_long(&self) -> Vec<LineItemRecord> {
        self.rows
            .iter()
            .flat_map(|row| {
                self.years
                    .iter()
                    .zip(&row.costs)
                    .filter_map(move |(year, cost)| {
                        cost.map(|cost| LineItemRecord {
                            year: *year,
                            county: row.county.clone(),
                            family_code: row.family_code.clone(),
                            family_type: row.family_type.clone(),
                            line_item: row.line_item.clone(),
                            line_group: row.line_group,
                            cost,
                        })
                    })
            })
            .collect()
    }
}
