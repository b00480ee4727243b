use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::TransactionTrait;
use tracing::instrument;

use engine::VerdictInput;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthActor;
use crate::extractors::json::AppJson;
use crate::models::verdict::{IngestVerdictRequest, VerdictResponse};
use crate::persist;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/verdicts",
    tag = "Verdicts",
    operation_id = "ingestVerdict",
    summary = "Ingest a judged verdict",
    description = "Appends one externally judged verdict to the contest ledger, assigning the next sequence number. A verdict that fails admission (contest not live, unknown or disqualified participant, outside the accept window) is dropped, never queued. Requires verdict-ingest capability (Owner or DualAdmin).",
    params(("id" = i32, Path, description = "Contest ID")),
    request_body = IngestVerdictRequest,
    responses(
        (status = 201, description = "Verdict recorded", body = VerdictResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest, participant or problem not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Verdict refused admission (SUBMISSION_REJECTED)", body = ErrorBody),
        (status = 503, description = "Contest halted for corrupt stored state (CONTEST_HALTED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, actor, payload),
    fields(id, participant_id = payload.participant_id, problem_id = payload.problem_id)
)]
pub async fn ingest_verdict(
    actor: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<IngestVerdictRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_ingest()?;

    let input = VerdictInput {
        participant_id: payload.participant_id,
        problem_id: payload.problem_id,
        verdict: payload.verdict,
        fraction: payload.fraction,
        submitted_at: payload.submitted_at,
    };
    let outcome = state.engine.submit_verdict(id, input).await?;

    let txn = state.db.begin().await?;
    persist::insert_record(&txn, &outcome.record).await?;
    if let Some(facts) = &outcome.facts_changed {
        persist::update_facts(&txn, id, facts).await?;
    }
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(VerdictResponse::from(outcome.record.as_ref())),
    ))
}
