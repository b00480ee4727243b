use common::Verdict;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission_record")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub contest_id: i32,
    /// Gap-free ledger position within the contest, starting at 1.
    #[sea_orm(primary_key)]
    pub seq: i64,
    #[sea_orm(belongs_to, from = "contest_id", to = "id")]
    pub contest: BelongsTo<super::contest::Entity>,

    pub participant_id: i32,
    pub problem_id: i32,
    pub verdict: Verdict,
    /// Credit fraction in [0, 1]; present iff the verdict is Partial.
    pub fraction: Option<f64>,
    pub submitted_at: DateTimeUtc,
    /// Pause-adjusted contest seconds at submission.
    pub elapsed_s: i64,
    /// Root seq this record corrects; NULL for original submissions.
    pub supersedes: Option<i64>,
}

impl ActiveModelBehavior for ActiveModel {}
