pub mod badge;
pub mod clock;
pub mod command;
pub mod contest_state;
pub mod participant;
pub mod role;
pub mod scoring_mode;
pub mod verdict;

pub use badge::BadgeTier;
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::AdminCommand;
pub use contest_state::ContestState;
pub use participant::ParticipantKind;
pub use role::Role;
pub use scoring_mode::ScoringMode;
pub use verdict::Verdict;
