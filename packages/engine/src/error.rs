use common::ContestState;
use std::fmt;
use thiserror::Error;

/// Why a submission was refused admission to the ledger. Closed vocabulary,
/// surfaced verbatim to the judging collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// Submitted before the start or after duration + grace.
    OutsideWindow,
    /// Contest is scheduled, paused or ended.
    ContestNotLive,
    /// The submitting participant has been disqualified.
    ParticipantDisqualified,
    /// The contest was cancelled; nothing is admitted any more.
    ContestCancelled,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutsideWindow => "OutsideWindow",
            Self::ContestNotLive => "ContestNotLive",
            Self::ParticipantDisqualified => "ParticipantDisqualified",
            Self::ContestCancelled => "ContestCancelled",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Contest {0} not found")]
    UnknownContest(i32),

    #[error("Contest {0} is already loaded")]
    DuplicateContest(i32),

    #[error("Participant {participant_id} is not registered as a competitor in contest {contest_id}")]
    UnknownParticipant { contest_id: i32, participant_id: i32 },

    #[error("Problem {problem_id} is not part of contest {contest_id}")]
    UnknownProblem { contest_id: i32, problem_id: i32 },

    #[error("No submission with seq {seq} in contest {contest_id}")]
    UnknownRecord { contest_id: i32, seq: u64 },

    #[error("Command {command} is not valid in state {state}")]
    InvalidTransition {
        state: ContestState,
        command: &'static str,
    },

    #[error("Submission rejected: {0}")]
    Rejected(RejectReason),

    #[error("Join window closed for contest {0}")]
    JoinClosed(i32),

    #[error("Participant {participant_id} already joined contest {contest_id}")]
    AlreadyJoined { contest_id: i32, participant_id: i32 },

    #[error("Invalid contest configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid verdict payload: {0}")]
    InvalidVerdict(String),

    #[error("Cutoff {cutoff} is beyond the ledger head {head}")]
    CutoffBeyondHead { cutoff: u64, head: u64 },

    #[error("Cutoff {cutoff} predates retained history (oldest kept seq {oldest})")]
    StaleCutoff { cutoff: u64, oldest: u64 },

    #[error("Contest {contest_id} halted after an integrity violation: {detail}")]
    Corrupt { contest_id: i32, detail: String },
}
