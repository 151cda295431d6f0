//! Versioned schema descriptors for Self-Sufficiency Standard "by family" sheets.
//!
//! Every publication year ships a spreadsheet whose column positions are the
//! only contract we get. A [`SchemaDescriptor`] spells that contract out as an
//! ordered list of named, typed fields, and every source is validated against
//! its descriptor before any of its rows reach the rest of the pipeline.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};

use crate::error::{Result, SssError};

/// Schema version of the published "by family" layout
pub const BY_FAMILY_V1: &str = "sss-by-family-v1";

/// Column names shared across the pipeline
pub mod columns {
    /// Publication year tag appended by the loader
    pub const YEAR: &str = "year";
    /// County name
    pub const COUNTY: &str = "county";
    /// Compact family composition code
    pub const FAMILY_TYPE: &str = "family_type";
    /// First column of the cost block
    pub const FIRST_COST: &str = "housing_costs";
    /// Last column of the cost block
    pub const LAST_COST: &str = "emergency_savings";
}

/// Declared type of a sheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Identifier or free text
    Text,
    /// Count, cost, tax or credit amount
    Numeric,
}

impl FieldKind {
    /// Arrow type the column is coerced to
    #[must_use]
    pub const fn data_type(self) -> DataType {
        match self {
            Self::Text => DataType::Utf8,
            Self::Numeric => DataType::Float64,
        }
    }
}

/// A single named, typed column of a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Normalized column name
    pub name: String,
    /// Declared type
    pub kind: FieldKind,
}

/// A schema incompatibility found while validating a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Zero-based column position, if the issue concerns a single column
    pub position: Option<usize>,
    /// Description of the incompatibility
    pub description: String,
}

/// Ordered, versioned description of a sheet layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    version: String,
    fields: Vec<FieldSpec>,
}

impl SchemaDescriptor {
    /// Create a descriptor from `(name, kind)` pairs
    pub fn new<S: Into<String>>(
        version: impl Into<String>,
        fields: impl IntoIterator<Item = (S, FieldKind)>,
    ) -> Self {
        Self {
            version: version.into(),
            fields: fields
                .into_iter()
                .map(|(name, kind)| FieldSpec {
                    name: name.into(),
                    kind,
                })
                .collect(),
        }
    }

    /// The published "by family" layout.
    ///
    /// 1 text, 5 numeric, 1 text, 2 numeric, 1 text, 14 numeric.
    #[must_use]
    pub fn by_family_v1() -> Self {
        use FieldKind::{Numeric, Text};

        Self::new(
            BY_FAMILY_V1,
            [
                ("family_type", Text),
                ("adults", Numeric),
                ("infants", Numeric),
                ("preschoolers", Numeric),
                ("school_agers", Numeric),
                ("teenagers", Numeric),
                ("state", Text),
                ("state_fips", Numeric),
                ("county_fips", Numeric),
                ("county", Text),
                ("housing_costs", Numeric),
                ("child_care_costs", Numeric),
                ("food_costs", Numeric),
                ("transportation_costs", Numeric),
                ("health_care_costs", Numeric),
                ("miscellaneous_costs", Numeric),
                ("taxes", Numeric),
                ("earned_income_tax_credit", Numeric),
                ("child_care_tax_credit", Numeric),
                ("child_tax_credit", Numeric),
                ("hourly_self_sufficiency_wage", Numeric),
                ("monthly_self_sufficiency_wage", Numeric),
                ("annual_self_sufficiency_wage", Numeric),
                ("emergency_savings", Numeric),
            ],
        )
    }

    /// Look up a registered descriptor by version string
    pub fn for_version(version: &str) -> Result<Self> {
        match version {
            BY_FAMILY_V1 => Ok(Self::by_family_v1()),
            other => Err(SssError::UnknownSchemaVersion(other.to_string())),
        }
    }

    /// Version string of this descriptor
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Declared fields in sheet order
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of declared columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the descriptor declares no columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Arrow schema the sheet is read into. All columns are nullable since
    /// published sheets leave cells blank where a line does not apply.
    #[must_use]
    pub fn arrow_schema(&self) -> SchemaRef {
        Arc::new(Schema::new(
            self.fields
                .iter()
                .map(|f| Field::new(&f.name, f.kind.data_type(), true))
                .collect::<Vec<_>>(),
        ))
    }

    /// Compare normalized sheet column names against the declared layout
    #[must_use]
    pub fn find_issues(&self, columns: &[String]) -> Vec<SchemaIssue> {
        if columns.len() != self.fields.len() {
            // Positions are meaningless once the counts differ
            return vec![SchemaIssue {
                position: None,
                description: format!(
                    "expected {} columns for schema '{}', found {}",
                    self.fields.len(),
                    self.version,
                    columns.len()
                ),
            }];
        }

        self.fields
            .iter()
            .zip(columns)
            .enumerate()
            .filter(|(_, (field, column))| field.name != **column)
            .map(|(i, (field, column))| SchemaIssue {
                position: Some(i),
                description: format!(
                    "column {} is '{}', expected '{}'",
                    i + 1,
                    column,
                    field.name
                ),
            })
            .collect()
    }

    /// Validate normalized sheet column names, failing with
    /// [`SssError::SchemaMismatch`] on any difference
    pub fn validate_columns(&self, columns: &[String], source_name: &str, year: i32) -> Result<()> {
        let issues = self.find_issues(columns);
        if issues.is_empty() {
            return Ok(());
        }

        let detail = issues
            .iter()
            .map(|issue| issue.description.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Err(SssError::schema_mismatch(source_name, year, detail))
    }
}

/// Normalize a raw sheet header to the pipeline's snake-case convention.
///
/// Lower-cases, collapses runs of non-alphanumeric characters into `_`,
/// trims separators at either end, then expands the abbreviated
/// composition-count headers.
#[must_use]
pub fn normalize_column_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            if pending_separator && !name.is_empty() {
                name.push('_');
            }
            pending_separator = false;
            name.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    match name.as_str() {
        "a" | "adult_s" | "adult" => "adults".to_string(),
        "i" | "infant_s" | "infant" => "infants".to_string(),
        "p" | "preschooler_s" | "preschooler" => "preschoolers".to_string(),
        "s" | "school_ager_s" | "school_age" | "schoolager_s" => "school_agers".to_string(),
        "t" | "teenager_s" | "teenager" => "teenagers".to_string(),
        _ => name,
    }
}
