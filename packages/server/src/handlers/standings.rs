use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use engine::StandingsPage;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthActor;
use crate::models::standings::StandingsQuery;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}/standings",
    tag = "Standings",
    operation_id = "getStandings",
    summary = "Read one standings page",
    description = "Folds the submission ledger into a deterministic, tie-broken standings page. While the board is frozen, non-privileged callers see the prefix pinned at the freeze; Owner and DualAdmin keep seeing the live board. The returned cutoff can be passed back to page through one consistent view.",
    params(("id" = i32, Path, description = "Contest ID"), StandingsQuery),
    responses(
        (status = 200, description = "Standings page", body = StandingsPage),
        (status = 400, description = "Cutoff beyond the ledger head (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Cutoff below retained history (STALE_CUTOFF)", body = ErrorBody),
        (status = 503, description = "Contest halted for corrupt stored state (CONTEST_HALTED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, query), fields(id))]
pub async fn get_standings(
    actor: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<StandingsQuery>,
) -> Result<Json<StandingsPage>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);

    let standings =
        state
            .engine
            .standings(id, actor.privileged_view(), page, per_page, query.cutoff)?;
    Ok(Json(standings))
}
