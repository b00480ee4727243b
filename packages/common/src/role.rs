use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::command::AdminCommand;

/// Caller role carried in the signed token minted by the identity
/// collaborator. The core trusts the claim; it never manages accounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum Role {
    /// Full control, including cancellation.
    Owner,
    /// Operational admin: lifecycle commands and verdict ingestion.
    DualAdmin,
    /// Contest authoring and rejudging.
    QuestionAdmin,
    /// Registered competitor.
    Participant,
    /// Read-only viewer.
    Spectator,
}

impl Role {
    /// Roles that keep seeing live standings while the board is frozen.
    pub fn sees_live_when_frozen(&self) -> bool {
        matches!(self, Self::Owner | Self::DualAdmin)
    }

    /// Roles allowed to register contests.
    pub fn may_author_contests(&self) -> bool {
        matches!(self, Self::Owner | Self::DualAdmin | Self::QuestionAdmin)
    }

    /// Roles allowed to push judged verdicts into a contest.
    pub fn may_ingest_verdicts(&self) -> bool {
        matches!(self, Self::Owner | Self::DualAdmin)
    }

    /// Per-command capability table for the admin surface.
    ///
    /// Cancel is reserved to the owner; rejudging is the one lifecycle-side
    /// power a question admin holds.
    pub fn may_issue(&self, command: &AdminCommand) -> bool {
        match self {
            Self::Owner => true,
            Self::DualAdmin => !matches!(command, AdminCommand::Cancel),
            Self::QuestionAdmin => matches!(command, AdminCommand::Rejudge { .. }),
            Self::Participant | Self::Spectator => false,
        }
    }

    /// All possible roles.
    pub const ALL: &'static [Role] = &[
        Self::Owner,
        Self::DualAdmin,
        Self::QuestionAdmin,
        Self::Participant,
        Self::Spectator,
    ];

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::DualAdmin => "DualAdmin",
            Self::QuestionAdmin => "QuestionAdmin",
            Self::Participant => "Participant",
            Self::Spectator => "Spectator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    invalid: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid role '{}'. Valid values: {}",
            self.invalid,
            Role::ALL
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Owner" => Ok(Self::Owner),
            "DualAdmin" => Ok(Self::DualAdmin),
            "QuestionAdmin" => Ok(Self::QuestionAdmin),
            "Participant" => Ok(Self::Participant),
            "Spectator" => Ok(Self::Spectator),
            _ => Err(ParseRoleError {
                invalid: s.to_string(),
            }),
        }
    }
}
