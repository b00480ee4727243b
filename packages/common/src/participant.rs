#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a participant is registered in a contest.
///
/// Competitors submit and appear on the leaderboard; spectators only watch
/// and may join at any time, even after the late-join grace has expired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum ParticipantKind {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Competitor"))]
    Competitor,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Spectator"))]
    Spectator,
}

impl ParticipantKind {
    pub fn is_competitor(&self) -> bool {
        matches!(self, Self::Competitor)
    }

    pub const ALL: &'static [ParticipantKind] = &[Self::Competitor, Self::Spectator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Competitor => "Competitor",
            Self::Spectator => "Spectator",
        }
    }
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid participant kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError {
    invalid: String,
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid participant kind '{}'. Valid values: Competitor, Spectator",
            self.invalid
        )
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for ParticipantKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Competitor" => Ok(Self::Competitor),
            "Spectator" => Ok(Self::Spectator),
            _ => Err(ParseKindError {
                invalid: s.to_string(),
            }),
        }
    }
}
