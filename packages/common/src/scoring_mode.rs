#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scoring rule set a contest is created with. Fixed for the lifetime of the
/// contest; the modes are mutually exclusive.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in
/// SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum ScoringMode {
    /// Binary problems, time penalty plus a fixed cost per wrong attempt.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Icpc"))]
    Icpc,
    /// Score decays linearly with submission time, wrong attempts deduct.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Codeforces"))]
    Codeforces,
    /// Partial credit, best fraction per problem counts, no time penalty.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "CustomPartial"))]
    CustomPartial,
}

impl ScoringMode {
    /// Only ICPC scoring carries a time penalty column.
    pub fn uses_penalty(&self) -> bool {
        matches!(self, Self::Icpc)
    }

    /// Partial-credit verdicts are only meaningful in this mode.
    pub fn accepts_partial_credit(&self) -> bool {
        matches!(self, Self::CustomPartial)
    }

    /// All possible modes.
    pub const ALL: &'static [ScoringMode] = &[Self::Icpc, Self::Codeforces, Self::CustomPartial];

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Icpc => "Icpc",
            Self::Codeforces => "Codeforces",
            Self::CustomPartial => "CustomPartial",
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid mode string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError {
    invalid: String,
}

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid scoring mode '{}'. Valid values: {}",
            self.invalid,
            ScoringMode::ALL
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for ScoringMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Icpc" => Ok(Self::Icpc),
            "Codeforces" => Ok(Self::Codeforces),
            "CustomPartial" => Ok(Self::CustomPartial),
            _ => Err(ParseModeError {
                invalid: s.to_string(),
            }),
        }
    }
}
