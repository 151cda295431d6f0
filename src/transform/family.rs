//! Decoding of compact family-type codes
//!
//! Codes look like `a2i1p1s0t0`: counts of adults, infants, preschoolers,
//! school-age children and teenagers, in that order.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;

/// Display labels for the family types reports usually compare
pub const FAMILY_TYPE_LABELS: &[(&str, &str)] = &[
    ("a1i0p0s0t0", "Single Adult"),
    ("a1i1p0s0t0", "Single Adult, Infant"),
    ("a1i0p1s0t0", "Single Adult, Preschooler"),
    ("a1i1p1s0t0", "Single Adult, Infant & Preschooler"),
    ("a1i0p1s1t0", "Single Adult, Preschooler & School-age"),
    ("a1i0p0s1t1", "Single Adult, School-age & Teenager"),
    ("a2i0p0s0t0", "Two Adults"),
    ("a2i1p1s0t0", "Two Adults, Infant & Preschooler"),
    ("a2i0p1s1t0", "Two Adults, Preschooler & School-age"),
];

static LABELS: LazyLock<FxHashMap<&'static str, &'static str>> =
    LazyLock::new(|| FAMILY_TYPE_LABELS.iter().copied().collect());

/// Household composition encoded by a family-type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FamilyComposition {
    /// Adults
    pub adults: u8,
    /// Infants (0-2)
    pub infants: u8,
    /// Preschoolers (3-5)
    pub preschoolers: u8,
    /// School-age children (6-12)
    pub school_agers: u8,
    /// Teenagers (13-18)
    pub teenagers: u8,
}

/// A family-type code that does not follow the `aNiNpNsNtN` pattern
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed family type code '{0}'")]
pub struct MalformedFamilyType(pub String);

impl FromStr for FamilyComposition {
    type Err = MalformedFamilyType;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedFamilyType(code.to_string());
        let mut counts = [0u8; 5];
        let mut rest = code.trim();

        for (slot, prefix) in counts.iter_mut().zip(['a', 'i', 'p', 's', 't']) {
            rest = rest
                .strip_prefix(prefix)
                .or_else(|| rest.strip_prefix(prefix.to_ascii_uppercase()))
                .ok_or_else(malformed)?;
            let digits = rest.chars().take_while(char::is_ascii_digit).count();
            if digits == 0 {
                return Err(malformed());
            }
            *slot = rest[..digits].parse().map_err(|_| malformed())?;
            rest = &rest[digits..];
        }

        if !rest.is_empty() {
            return Err(malformed());
        }

        let [adults, infants, preschoolers, school_agers, teenagers] = counts;
        Ok(Self {
            adults,
            infants,
            preschoolers,
            school_agers,
            teenagers,
        })
    }
}

impl FamilyComposition {
    /// Parse a family-type code
    pub fn parse(code: &str) -> Result<Self, MalformedFamilyType> {
        code.parse()
    }

    /// Compact code for this composition
    #[must_use]
    pub fn code(&self) -> String {
        format!(
            "a{}i{}p{}s{}t{}",
            self.adults, self.infants, self.preschoolers, self.school_agers, self.teenagers
        )
    }
}

impl fmt::Display for FamilyComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = [
            (self.adults, "Adult", "Adults"),
            (self.infants, "Infant", "Infants"),
            (self.preschoolers, "Preschooler", "Preschoolers"),
            (self.school_agers, "School-age", "School-age"),
            (self.teenagers, "Teenager", "Teenagers"),
        ];

        let parts: Vec<String> = members
            .iter()
            .filter(|(count, _, _)| *count > 0)
            .map(|(count, one, many)| format!("{count} {}", if *count == 1 { one } else { many }))
            .collect();

        if parts.is_empty() {
            f.write_str("No Members")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Display label for a family-type code.
///
/// Known codes use [`FAMILY_TYPE_LABELS`]; other well-formed codes are
/// described from their composition; malformed codes pass through unchanged.
#[must_use]
pub fn decode_family_type(code: &str) -> String {
    if let Some(label) = LABELS.get(code) {
        return (*label).to_string();
    }

    match FamilyComposition::parse(code) {
        Ok(composition) => composition.to_string(),
        Err(e) => {
            log::debug!("{e}; leaving it undecoded");
            code.to_string()
        }
    }
}
