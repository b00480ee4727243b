//! Startup rehydration of the engine from durable rows.
//!
//! Config and lifecycle facts are pure data; the engine re-validates both
//! and re-derives the current state from the clock, so there is no separate
//! recovery log. A contest whose rows fail validation is quarantined inside
//! the engine; rows that cannot even be mapped to engine types (impossible
//! negatives) are quarantined here with the same alarm.

use chrono::Duration;
use sea_orm::*;
use tracing::info;

use engine::{
    ContestConfig, ContestEngine, LifecycleFacts, ParticipantEntry, ProblemSlot, SubmissionRecord,
};

use crate::entity::{contest, contest_participant, contest_problem, submission_record};

/// Loads every stored contest into the engine. Returns the number of
/// contests loaded, quarantined ones included; database errors abort
/// startup.
pub async fn load_contests(
    db: &DatabaseConnection,
    engine: &ContestEngine,
) -> anyhow::Result<usize> {
    let rows = contest::Entity::find()
        .order_by_asc(contest::Column::Id)
        .all(db)
        .await?;
    let total = rows.len();

    for row in rows {
        let contest_id = row.id;
        let problems: Vec<ProblemSlot> = contest_problem::Entity::find()
            .filter(contest_problem::Column::ContestId.eq(contest_id))
            .order_by_asc(contest_problem::Column::Position)
            .all(db)
            .await?
            .into_iter()
            .map(slot_from_row)
            .collect();
        let participants: Vec<ParticipantEntry> = contest_participant::Entity::find()
            .filter(contest_participant::Column::ContestId.eq(contest_id))
            .order_by_asc(contest_participant::Column::ParticipantId)
            .all(db)
            .await?
            .into_iter()
            .map(participant_from_row)
            .collect();
        let record_rows = submission_record::Entity::find()
            .filter(submission_record::Column::ContestId.eq(contest_id))
            .order_by_asc(submission_record::Column::Seq)
            .all(db)
            .await?;

        match map_contest(&row, record_rows) {
            Ok((config, facts, records)) => {
                engine.restore_contest(contest_id, config, problems, facts, participants, records)?;
            }
            Err(detail) => engine.quarantine_contest(contest_id, detail),
        }
    }

    info!(total, "contests loaded from storage");
    Ok(total)
}

fn map_contest(
    row: &contest::Model,
    record_rows: Vec<submission_record::Model>,
) -> Result<(ContestConfig, LifecycleFacts, Vec<SubmissionRecord>), String> {
    let config = config_from_row(row)?;
    let facts = facts_from_row(row)?;
    let records = record_rows
        .into_iter()
        .map(record_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((config, facts, records))
}

fn config_from_row(row: &contest::Model) -> Result<ContestConfig, String> {
    let decay_floor_pct = u8::try_from(row.decay_floor_pct)
        .map_err(|_| format!("decay floor {} out of range", row.decay_floor_pct))?;
    let wrong_deduction_pct = u8::try_from(row.wrong_deduction_pct)
        .map_err(|_| format!("wrong deduction {} out of range", row.wrong_deduction_pct))?;
    Ok(ContestConfig {
        title: row.title.clone(),
        start_time: row.start_time,
        duration: Duration::seconds(row.duration_s),
        grace: Duration::seconds(row.grace_s),
        freeze_offset: Duration::seconds(row.freeze_offset_s),
        scoring: row.scoring,
        wrong_penalty: Duration::seconds(row.wrong_penalty_s),
        decay_floor_pct,
        wrong_deduction_pct,
        auto_end: row.auto_end,
    })
}

fn facts_from_row(row: &contest::Model) -> Result<LifecycleFacts, String> {
    let freeze_cutoff = row
        .freeze_cutoff
        .map(|raw| u64::try_from(raw).map_err(|_| format!("negative freeze cutoff {raw}")))
        .transpose()?;
    Ok(LifecycleFacts {
        started_at: row.started_at,
        paused_at: row.paused_at,
        total_paused: Duration::seconds(row.total_paused_s),
        frozen_at: row.frozen_at,
        freeze_cutoff,
        ended_at: row.ended_at,
        cancelled_at: row.cancelled_at,
    })
}

fn record_from_row(row: submission_record::Model) -> Result<SubmissionRecord, String> {
    let seq = u64::try_from(row.seq).map_err(|_| format!("negative seq {}", row.seq))?;
    let supersedes = row
        .supersedes
        .map(|raw| {
            u64::try_from(raw).map_err(|_| format!("negative supersedes {raw} on seq {seq}"))
        })
        .transpose()?;
    Ok(SubmissionRecord {
        contest_id: row.contest_id,
        seq,
        participant_id: row.participant_id,
        problem_id: row.problem_id,
        verdict: row.verdict,
        fraction: row.fraction,
        submitted_at: row.submitted_at,
        elapsed: Duration::seconds(row.elapsed_s),
        supersedes,
    })
}

fn slot_from_row(row: contest_problem::Model) -> ProblemSlot {
    ProblemSlot {
        problem_id: row.problem_id,
        weight: row.weight,
        position: row.position,
    }
}

fn participant_from_row(row: contest_participant::Model) -> ParticipantEntry {
    ParticipantEntry {
        participant_id: row.participant_id,
        display_name: row.display_name,
        kind: row.kind,
        joined_at: row.joined_at,
        rating: row.rating,
        disqualified: row.disqualified,
    }
}
