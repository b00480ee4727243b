use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a contest.
///
/// The state is derived from recorded lifecycle facts plus the clock; it is
/// never stored as a column of its own, so a crashed process re-derives the
/// same state on restart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ContestState {
    /// Created but not yet started.
    Scheduled,
    /// Running; submissions accepted, standings public.
    Live,
    /// Running with the public leaderboard pinned at the freeze cutoff.
    FrozenLive,
    /// Clock suspended by an admin; submissions rejected.
    Paused,
    /// Finished normally. Terminal.
    Ended,
    /// Aborted by the owner. Terminal.
    Cancelled,
}

impl ContestState {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }

    /// Returns true while the contest clock is running.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Live | Self::FrozenLive)
    }

    /// Submissions are only admitted while the contest is running.
    pub fn accepts_submissions(&self) -> bool {
        self.is_running()
    }

    /// All possible states.
    pub const ALL: &'static [ContestState] = &[
        Self::Scheduled,
        Self::Live,
        Self::FrozenLive,
        Self::Paused,
        Self::Ended,
        Self::Cancelled,
    ];

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Live => "Live",
            Self::FrozenLive => "FrozenLive",
            Self::Paused => "Paused",
            Self::Ended => "Ended",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ContestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid state string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStateError {
    invalid: String,
}

impl fmt::Display for ParseStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid contest state '{}'. Valid values: {}",
            self.invalid,
            ContestState::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStateError {}

impl FromStr for ContestState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(Self::Scheduled),
            "Live" => Ok(Self::Live),
            "FrozenLive" => Ok(Self::FrozenLive),
            "Paused" => Ok(Self::Paused),
            "Ended" => Ok(Self::Ended),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseStateError {
                invalid: s.to_string(),
            }),
        }
    }
}
