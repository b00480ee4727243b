use common::ScoringMode;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub start_time: DateTimeUtc,
    // Configured spans, stored in whole seconds.
    pub duration_s: i64,
    pub grace_s: i64,
    pub freeze_offset_s: i64,
    pub scoring: ScoringMode,
    pub wrong_penalty_s: i64,
    pub decay_floor_pct: i32,
    pub wrong_deduction_pct: i32,
    pub auto_end: bool,

    // Lifecycle facts. The contest state is derived from these plus the
    // clock and never stored.
    pub started_at: Option<DateTimeUtc>,
    pub paused_at: Option<DateTimeUtc>,
    pub total_paused_s: i64,
    pub frozen_at: Option<DateTimeUtc>,
    pub freeze_cutoff: Option<i64>,
    pub ended_at: Option<DateTimeUtc>,
    pub cancelled_at: Option<DateTimeUtc>,

    #[sea_orm(has_many)]
    pub problems: HasMany<super::contest_problem::Entity>,

    #[sea_orm(has_many)]
    pub participants: HasMany<super::contest_participant::Entity>,

    #[sea_orm(has_many)]
    pub records: HasMany<super::submission_record::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
