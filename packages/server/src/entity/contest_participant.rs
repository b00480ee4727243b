use common::ParticipantKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest_participant")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub contest_id: i32,
    #[sea_orm(primary_key)]
    pub participant_id: i32,
    #[sea_orm(belongs_to, from = "contest_id", to = "id")]
    pub contest: BelongsTo<super::contest::Entity>,

    pub display_name: String,
    pub kind: ParticipantKind,
    /// Rating snapshot taken at join time; NULL for unrated entrants.
    pub rating: Option<i32>,
    pub disqualified: bool,

    pub joined_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
