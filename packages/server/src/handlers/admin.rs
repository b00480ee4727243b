use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use sea_orm::TransactionTrait;
use tracing::instrument;

use common::AdminCommand;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthActor;
use crate::extractors::json::AppJson;
use crate::models::admin::AdminCommandResponse;
use crate::models::verdict::VerdictResponse;
use crate::persist;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/admin",
    tag = "Admin",
    operation_id = "applyAdminCommand",
    summary = "Apply an admin command",
    description = "Applies one command from the admin vocabulary: Start, Pause, Resume, FreezeNow, End, Cancel, Disqualify or Rejudge. Which commands a caller may issue depends on their role; Cancel is reserved to the Owner and Rejudge is also open to QuestionAdmin. A command not valid in the contest's current state fails with no side effects.",
    params(("id" = i32, Path, description = "Contest ID")),
    request_body = AdminCommand,
    responses(
        (status = 200, description = "Command applied", body = AdminCommandResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest, participant or record not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Command not allowed in the current state (INVALID_TRANSITION)", body = ErrorBody),
        (status = 503, description = "Contest halted for corrupt stored state (CONTEST_HALTED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, payload), fields(id, command = payload.name()))]
pub async fn apply_admin_command(
    actor: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AdminCommand>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_command(&payload)?;

    let outcome = state.engine.apply_admin(id, &payload).await?;

    let txn = state.db.begin().await?;
    persist::update_facts(&txn, id, &outcome.facts).await?;
    if let Some(record) = &outcome.rejudge {
        persist::insert_record(&txn, record).await?;
    }
    if let Some(entry) = &outcome.disqualified {
        persist::set_disqualified(&txn, id, entry.participant_id).await?;
    }
    txn.commit().await?;

    Ok(Json(AdminCommandResponse {
        contest_id: id,
        state: outcome.state,
        correction: outcome.rejudge.as_deref().map(VerdictResponse::from),
    }))
}
