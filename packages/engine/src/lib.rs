//! Contest-core runtime: lifecycle clock, submission ledger, scoring folds
//! and standings projection, independent of any transport or storage.

pub mod config;
pub mod contest;
pub mod core;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod ranking;
pub mod scoring;

pub use common::{Clock, ManualClock, SystemClock};

pub use crate::core::ContestEngine;
pub use config::{ContestConfig, ProblemSlot};
pub use contest::{
    AdminOutcome, JoinOutcome, JoinRequest, ParticipantEntry, StateView, SubmitOutcome,
    VerdictInput,
};
pub use error::{EngineError, RejectReason};
pub use ledger::{PendingRecord, SubmissionRecord};
pub use lifecycle::LifecycleFacts;
pub use ranking::{CellView, StandingsEntry, StandingsPage};
pub use scoring::CellState;
