use serde::{Deserialize, Serialize};

use crate::verdict::Verdict;

/// Privileged command applied to a contest through the admin control surface.
///
/// Serialized with an internal `command` tag so request bodies read naturally
/// (`{"command": "Pause"}`, `{"command": "Rejudge", "seq": 12, ...}`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "command")]
pub enum AdminCommand {
    /// Start the contest ahead of its scheduled time.
    Start,
    /// Suspend the contest clock.
    Pause,
    /// Resume a paused contest.
    Resume,
    /// Pin the public leaderboard at the current ledger position.
    FreezeNow,
    /// End the contest now.
    End,
    /// Abort the contest. Irreversible.
    Cancel,
    /// Exclude a competitor from the standings; their records stay on file.
    Disqualify { participant_id: i32 },
    /// Append a corrected verdict that supersedes an existing record.
    Rejudge {
        seq: u64,
        verdict: Verdict,
        #[serde(default)]
        fraction: Option<f64>,
    },
}

impl AdminCommand {
    /// Command name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Pause => "Pause",
            Self::Resume => "Resume",
            Self::FreezeNow => "FreezeNow",
            Self::End => "End",
            Self::Cancel => "Cancel",
            Self::Disqualify { .. } => "Disqualify",
            Self::Rejudge { .. } => "Rejudge",
        }
    }
}
