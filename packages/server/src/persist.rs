//! Write-side mapping from engine outcomes to durable rows.
//!
//! The engine orders every operation; rows are written after it accepts one.
//! Lifecycle fact columns are overwritten wholesale, submission record rows
//! are append-only.

use chrono::{DateTime, Utc};
use sea_orm::*;

use engine::{ContestConfig, LifecycleFacts, ParticipantEntry, ProblemSlot, SubmissionRecord};

use crate::entity::{contest, contest_participant, contest_problem, submission_record};

/// Inserts the contest row plus its problem columns and returns the row
/// with the assigned id.
pub async fn insert_contest(
    db: &DatabaseConnection,
    config: &ContestConfig,
    problems: &[ProblemSlot],
    now: DateTime<Utc>,
) -> Result<contest::Model, DbErr> {
    let txn = db.begin().await?;
    let model = contest::ActiveModel {
        title: Set(config.title.clone()),
        start_time: Set(config.start_time),
        duration_s: Set(config.duration.num_seconds()),
        grace_s: Set(config.grace.num_seconds()),
        freeze_offset_s: Set(config.freeze_offset.num_seconds()),
        scoring: Set(config.scoring),
        wrong_penalty_s: Set(config.wrong_penalty.num_seconds()),
        decay_floor_pct: Set(i32::from(config.decay_floor_pct)),
        wrong_deduction_pct: Set(i32::from(config.wrong_deduction_pct)),
        auto_end: Set(config.auto_end),
        total_paused_s: Set(0),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    for slot in problems {
        contest_problem::ActiveModel {
            contest_id: Set(model.id),
            problem_id: Set(slot.problem_id),
            weight: Set(slot.weight),
            position: Set(slot.position),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;
    Ok(model)
}

/// Overwrites the lifecycle fact columns after the engine moved the clock.
pub async fn update_facts<C: ConnectionTrait>(
    db: &C,
    contest_id: i32,
    facts: &LifecycleFacts,
) -> Result<(), DbErr> {
    contest::ActiveModel {
        id: Set(contest_id),
        started_at: Set(facts.started_at),
        paused_at: Set(facts.paused_at),
        total_paused_s: Set(facts.total_paused.num_seconds()),
        frozen_at: Set(facts.frozen_at),
        freeze_cutoff: Set(facts.freeze_cutoff.map(|seq| seq as i64)),
        ended_at: Set(facts.ended_at),
        cancelled_at: Set(facts.cancelled_at),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

pub async fn insert_participant<C: ConnectionTrait>(
    db: &C,
    contest_id: i32,
    entry: &ParticipantEntry,
) -> Result<(), DbErr> {
    contest_participant::ActiveModel {
        contest_id: Set(contest_id),
        participant_id: Set(entry.participant_id),
        display_name: Set(entry.display_name.clone()),
        kind: Set(entry.kind),
        rating: Set(entry.rating),
        disqualified: Set(entry.disqualified),
        joined_at: Set(entry.joined_at),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

pub async fn set_disqualified<C: ConnectionTrait>(
    db: &C,
    contest_id: i32,
    participant_id: i32,
) -> Result<(), DbErr> {
    contest_participant::ActiveModel {
        contest_id: Set(contest_id),
        participant_id: Set(participant_id),
        disqualified: Set(true),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

pub async fn insert_record<C: ConnectionTrait>(
    db: &C,
    record: &SubmissionRecord,
) -> Result<(), DbErr> {
    submission_record::ActiveModel {
        contest_id: Set(record.contest_id),
        seq: Set(record.seq as i64),
        participant_id: Set(record.participant_id),
        problem_id: Set(record.problem_id),
        verdict: Set(record.verdict),
        fraction: Set(record.fraction),
        submitted_at: Set(record.submitted_at),
        elapsed_s: Set(record.elapsed.num_seconds()),
        supersedes: Set(record.supersedes.map(|seq| seq as i64)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}
