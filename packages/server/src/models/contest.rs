use chrono::{DateTime, Duration, Utc};
use common::{ContestState, ParticipantKind, ScoringMode};
use engine::{ContestConfig, ParticipantEntry, ProblemSlot};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_title};
use crate::error::AppError;

/// One leaderboard column of a new contest. Positions are assigned
/// 0, 1, 2… by array index.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ProblemSlotRequest {
    #[schema(example = 42)]
    pub problem_id: i32,
    /// Full score of the problem.
    #[schema(example = 500)]
    pub weight: i64,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateContestRequest {
    #[schema(example = "Weekly Round 12")]
    pub title: String,
    pub start_time: DateTime<Utc>,
    /// Scheduled length in seconds.
    #[schema(example = 7200)]
    pub duration_s: i64,
    /// Late-join window in seconds, measured from the actual start;
    /// 0 disables joining after start.
    #[serde(default)]
    #[schema(example = 900)]
    pub grace_s: i64,
    /// Standings freeze this many seconds before the effective end;
    /// 0 disables the freeze.
    #[serde(default)]
    #[schema(example = 1200)]
    pub freeze_offset_s: i64,
    pub scoring: ScoringMode,
    /// ICPC cost of one wrong pre-accept attempt, in seconds.
    #[serde(default = "default_wrong_penalty_s")]
    #[schema(example = 1200)]
    pub wrong_penalty_s: i64,
    /// Codeforces score floor at the scheduled end, as % of weight.
    #[serde(default = "default_decay_floor_pct")]
    #[schema(example = 30)]
    pub decay_floor_pct: u8,
    /// Codeforces deduction per wrong pre-accept attempt, as % of weight.
    #[serde(default = "default_wrong_deduction_pct")]
    #[schema(example = 10)]
    pub wrong_deduction_pct: u8,
    /// Whether the contest ends itself at the effective end time.
    #[serde(default = "default_auto_end")]
    pub auto_end: bool,
    /// Leaderboard columns in display order. Must not be empty.
    pub problems: Vec<ProblemSlotRequest>,
}

fn default_wrong_penalty_s() -> i64 {
    1200
}

fn default_decay_floor_pct() -> u8 {
    30
}

fn default_wrong_deduction_pct() -> u8 {
    10
}

fn default_auto_end() -> bool {
    true
}

impl CreateContestRequest {
    /// Splits the request into the engine's configuration and problem
    /// columns. Column positions follow the array order.
    pub fn into_engine(self) -> (ContestConfig, Vec<ProblemSlot>) {
        let problems = self
            .problems
            .iter()
            .enumerate()
            .map(|(idx, slot)| ProblemSlot {
                problem_id: slot.problem_id,
                weight: slot.weight,
                position: idx as i32,
            })
            .collect();
        let config = ContestConfig {
            title: self.title.trim().to_string(),
            start_time: self.start_time,
            duration: Duration::seconds(self.duration_s),
            grace: Duration::seconds(self.grace_s),
            freeze_offset: Duration::seconds(self.freeze_offset_s),
            scoring: self.scoring,
            wrong_penalty: Duration::seconds(self.wrong_penalty_s),
            decay_floor_pct: self.decay_floor_pct,
            wrong_deduction_pct: self.wrong_deduction_pct,
            auto_end: self.auto_end,
        };
        (config, problems)
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ContestListQuery {
    /// Page number (1-indexed).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page (1-100, default 20).
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct JoinContestRequest {
    pub kind: ParticipantKind,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContestProblemResponse {
    #[schema(example = 42)]
    pub problem_id: i32,
    #[schema(example = 500)]
    pub weight: i64,
    /// Leaderboard column, zero-based.
    #[schema(example = 0)]
    pub position: i32,
}

impl From<crate::entity::contest_problem::Model> for ContestProblemResponse {
    fn from(m: crate::entity::contest_problem::Model) -> Self {
        Self {
            problem_id: m.problem_id,
            weight: m.weight,
            position: m.position,
        }
    }
}

impl From<&ProblemSlot> for ContestProblemResponse {
    fn from(slot: &ProblemSlot) -> Self {
        Self {
            problem_id: slot.problem_id,
            weight: slot.weight,
            position: slot.position,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContestResponse {
    pub id: i32,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration_s: i64,
    pub grace_s: i64,
    pub freeze_offset_s: i64,
    pub scoring: ScoringMode,
    pub wrong_penalty_s: i64,
    pub decay_floor_pct: i32,
    pub wrong_deduction_pct: i32,
    pub auto_end: bool,
    /// Derived at read time; null while the contest is halted for corrupt
    /// stored state.
    pub state: Option<ContestState>,
    pub problems: Vec<ContestProblemResponse>,
    pub created_at: DateTime<Utc>,
}

impl ContestResponse {
    pub fn from_model(
        m: crate::entity::contest::Model,
        problems: Vec<ContestProblemResponse>,
        state: Option<ContestState>,
    ) -> Self {
        Self {
            id: m.id,
            title: m.title,
            start_time: m.start_time,
            duration_s: m.duration_s,
            grace_s: m.grace_s,
            freeze_offset_s: m.freeze_offset_s,
            scoring: m.scoring,
            wrong_penalty_s: m.wrong_penalty_s,
            decay_floor_pct: m.decay_floor_pct,
            wrong_deduction_pct: m.wrong_deduction_pct,
            auto_end: m.auto_end,
            state,
            problems,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContestListItem {
    pub id: i32,
    pub title: String,
    pub start_time: DateTime<Utc>,
    /// Derived at read time; null while the contest is halted.
    pub state: Option<ContestState>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContestListResponse {
    pub data: Vec<ContestListItem>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ParticipantResponse {
    pub contest_id: i32,
    pub participant_id: i32,
    pub display_name: String,
    pub kind: ParticipantKind,
    /// Rating snapshot taken at join time.
    pub rating: Option<i32>,
    pub joined_at: DateTime<Utc>,
}

impl ParticipantResponse {
    pub fn from_entry(contest_id: i32, entry: &ParticipantEntry) -> Self {
        Self {
            contest_id,
            participant_id: entry.participant_id,
            display_name: entry.display_name.clone(),
            kind: entry.kind,
            rating: entry.rating,
            joined_at: entry.joined_at,
        }
    }
}

pub fn validate_create_contest(req: &CreateContestRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    if req.problems.is_empty() {
        return Err(AppError::Validation(
            "Contest must have at least one problem".into(),
        ));
    }
    Ok(())
}
