#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Final verdict attached to a submission by the judging collaborator.
///
/// Verdicts arrive already judged; the contest core never re-runs code. A
/// `Partial` verdict carries its credit fraction alongside the verdict (see
/// the submission record), not inside the enum, so the type stays storable
/// as a plain string column.
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
pub enum Verdict {
    /// Full credit.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Accepted"))]
    Accepted,
    /// Output did not match expected output.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "WrongAnswer"))]
    WrongAnswer,
    /// Partial credit; the fraction travels next to the verdict.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Partial"))]
    Partial,
    /// Failed to compile.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "CompileError"))]
    CompileError,
    /// Program crashed or exited with non-zero code.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RuntimeError"))]
    RuntimeError,
}

impl Verdict {
    /// Returns true for the full-credit verdict.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Returns true if this verdict must carry a credit fraction.
    pub fn requires_fraction(&self) -> bool {
        matches!(self, Self::Partial)
    }

    /// All possible verdict values.
    pub const ALL: &'static [Verdict] = &[
        Self::Accepted,
        Self::WrongAnswer,
        Self::Partial,
        Self::CompileError,
        Self::RuntimeError,
    ];

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::WrongAnswer => "WrongAnswer",
            Self::Partial => "Partial",
            Self::CompileError => "CompileError",
            Self::RuntimeError => "RuntimeError",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid verdict string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVerdictError {
    invalid: String,
}

impl fmt::Display for ParseVerdictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid verdict '{}'. Valid values: {}",
            self.invalid,
            Verdict::ALL
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseVerdictError {}

impl FromStr for Verdict {
    type Err = ParseVerdictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Accepted" => Ok(Self::Accepted),
            "WrongAnswer" => Ok(Self::WrongAnswer),
            "Partial" => Ok(Self::Partial),
            "CompileError" => Ok(Self::CompileError),
            "RuntimeError" => Ok(Self::RuntimeError),
            _ => Err(ParseVerdictError {
                invalid: s.to_string(),
            }),
        }
    }
}
