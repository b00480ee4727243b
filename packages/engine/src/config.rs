use chrono::{DateTime, Duration, Utc};
use common::ScoringMode;
use std::collections::HashSet;

use crate::error::EngineError;

/// Immutable setup of a contest, fixed at registration. Lifecycle facts and
/// the ledger evolve; the configuration never does.
#[derive(Clone, Debug)]
pub struct ContestConfig {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration: Duration,
    /// Late-join window measured from the actual start; zero disables
    /// joining after start.
    pub grace: Duration,
    /// Standings freeze this long before the effective end; zero disables
    /// the automatic freeze.
    pub freeze_offset: Duration,
    pub scoring: ScoringMode,
    /// Cost of one wrong pre-accept attempt. Only read in ICPC mode.
    pub wrong_penalty: Duration,
    /// Codeforces floor as a percentage of problem weight.
    pub decay_floor_pct: u8,
    /// Codeforces deduction per wrong attempt, percentage of weight.
    pub wrong_deduction_pct: u8,
    /// When set, the contest ends itself at the effective end time;
    /// otherwise an admin must end it.
    pub auto_end: bool,
}

impl ContestConfig {
    pub fn freeze_enabled(&self) -> bool {
        self.freeze_offset > Duration::zero()
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.title.trim().is_empty() {
            return Err(EngineError::InvalidConfig("title must not be empty".into()));
        }
        if self.duration <= Duration::zero() {
            return Err(EngineError::InvalidConfig("duration must be positive".into()));
        }
        if self.grace < Duration::zero() {
            return Err(EngineError::InvalidConfig("grace must not be negative".into()));
        }
        if self.grace > Duration::zero() && self.grace >= self.duration {
            return Err(EngineError::InvalidConfig(
                "grace must be shorter than the duration".into(),
            ));
        }
        if self.freeze_offset < Duration::zero() {
            return Err(EngineError::InvalidConfig(
                "freeze offset must not be negative".into(),
            ));
        }
        if self.freeze_offset > self.duration {
            return Err(EngineError::InvalidConfig(
                "freeze offset must not exceed the duration".into(),
            ));
        }
        if self.wrong_penalty < Duration::zero() {
            return Err(EngineError::InvalidConfig(
                "wrong-submission penalty must not be negative".into(),
            ));
        }
        if self.decay_floor_pct > 100 {
            return Err(EngineError::InvalidConfig(
                "decay floor must be a percentage between 0 and 100".into(),
            ));
        }
        if self.wrong_deduction_pct > 100 {
            return Err(EngineError::InvalidConfig(
                "wrong deduction must be a percentage between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

/// One problem attached to a contest. Authored externally; the core only
/// needs the weight and the leaderboard column position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProblemSlot {
    pub problem_id: i32,
    pub weight: i64,
    pub position: i32,
}

/// Checks weight positivity and uniqueness of ids and column positions.
pub fn validate_problems(problems: &[ProblemSlot]) -> Result<(), EngineError> {
    let mut ids = HashSet::new();
    let mut positions = HashSet::new();
    for problem in problems {
        if problem.weight <= 0 {
            return Err(EngineError::InvalidConfig(format!(
                "problem {} must have a positive weight",
                problem.problem_id
            )));
        }
        if !ids.insert(problem.problem_id) {
            return Err(EngineError::InvalidConfig(format!(
                "problem {} listed twice",
                problem.problem_id
            )));
        }
        if !positions.insert(problem.position) {
            return Err(EngineError::InvalidConfig(format!(
                "column position {} used twice",
                problem.position
            )));
        }
    }
    Ok(())
}
