use serde::{Deserialize, Serialize};
use std::fmt;

/// Rating cutoffs for badge tiers.
pub const GOLD_FLOOR: i32 = 2000;
pub const SILVER_FLOOR: i32 = 1500;

/// Decorative tier shown next to a participant on the leaderboard.
/// Pure function of the external rating; never affects ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum BadgeTier {
    Gold,
    Silver,
    Bronze,
}

impl BadgeTier {
    pub fn from_rating(rating: i32) -> Self {
        if rating >= GOLD_FLOOR {
            Self::Gold
        } else if rating >= SILVER_FLOOR {
            Self::Silver
        } else {
            Self::Bronze
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Bronze => "Bronze",
        }
    }
}

impl fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
