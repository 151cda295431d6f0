//! Classification of line items into display groups

use std::fmt;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Coarse bucket a line item is shown under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineGroup {
    /// Basic needs budget
    Costs,
    /// Taxes owed and credits received
    #[serde(rename = "Tax Effects")]
    TaxEffects,
    /// Savings set aside
    Other,
    /// Wages and any line not listed elsewhere
    #[serde(rename = "Minimum Income")]
    MinimumIncome,
}

static GROUPS: LazyLock<FxHashMap<&'static str, LineGroup>> = LazyLock::new(|| {
    [
        ("Housing", LineGroup::Costs),
        ("Child Care", LineGroup::Costs),
        ("Food", LineGroup::Costs),
        ("Transportation", LineGroup::Costs),
        ("Health Care", LineGroup::Costs),
        ("Miscellaneous", LineGroup::Costs),
        ("Taxes", LineGroup::TaxEffects),
        ("Earned Income Tax Credit", LineGroup::TaxEffects),
        ("Child Care Tax Credit", LineGroup::TaxEffects),
        ("Emergency Savings", LineGroup::Other),
    ]
    .into_iter()
    .collect()
});

impl LineGroup {
    /// Group for a display label; unlisted labels fall into `Minimum Income`
    #[must_use]
    pub fn classify(label: &str) -> Self {
        GROUPS.get(label).copied().unwrap_or(Self::MinimumIncome)
    }

    /// Display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Costs => "Costs",
            Self::TaxEffects => "Tax Effects",
            Self::Other => "Other",
            Self::MinimumIncome => "Minimum Income",
        }
    }
}

impl fmt::Display for LineGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
