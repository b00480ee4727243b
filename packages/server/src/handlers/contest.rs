use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use common::Role;
use engine::config::validate_problems;
use engine::{JoinRequest, StateView};

use crate::entity::{contest, contest_problem};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthActor;
use crate::extractors::json::AppJson;
use crate::models::contest::*;
use crate::models::shared::Pagination;
use crate::persist;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Contests",
    operation_id = "createContest",
    summary = "Register a contest",
    description = "Registers a contest definition with its problem columns in Scheduled state. Requires an authoring role (QuestionAdmin or above).",
    request_body = CreateContestRequest,
    responses(
        (status = 201, description = "Contest registered", body = ContestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, payload), fields(title = %payload.title))]
pub async fn create_contest(
    actor: AuthActor,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateContestRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require_author()?;
    validate_create_contest(&payload)?;

    let (config, problems) = payload.into_engine();
    config.validate()?;
    validate_problems(&problems)?;

    let model = persist::insert_contest(&state.db, &config, &problems, state.engine.now()).await?;
    let problem_views: Vec<ContestProblemResponse> =
        problems.iter().map(ContestProblemResponse::from).collect();
    state.engine.create_contest(model.id, config, problems)?;

    let derived = state.engine.contest_state(model.id).ok().map(|v| v.state);
    let response = ContestResponse::from_model(model, problem_views, derived);
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Contests",
    operation_id = "listContests",
    summary = "List contests",
    description = "Returns a paginated id/title/state listing ordered by start time, newest first. The state is derived per contest at read time; a halted contest lists with a null state.",
    params(ContestListQuery),
    responses(
        (status = 200, description = "List of contests", body = ContestListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _actor, query))]
pub async fn list_contests(
    _actor: AuthActor,
    State(state): State<AppState>,
    Query(query): Query<ContestListQuery>,
) -> Result<Json<ContestListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let select = contest::Entity::find();
    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let rows = select
        .order_by_desc(contest::Column::StartTime)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let data = rows
        .into_iter()
        .map(|row| ContestListItem {
            state: state.engine.contest_state(row.id).ok().map(|v| v.state),
            id: row.id,
            title: row.title,
            start_time: row.start_time,
        })
        .collect();

    Ok(Json(ContestListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Contests",
    operation_id = "getContest",
    summary = "Get a contest by ID",
    description = "Returns the configuration of a contest with its problem columns and the derived state.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Contest details", body = ContestResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _actor), fields(id))]
pub async fn get_contest(
    _actor: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ContestResponse>, AppError> {
    let model = find_contest(&state.db, id).await?;
    let problems = contest_problem::Entity::find()
        .filter(contest_problem::Column::ContestId.eq(id))
        .order_by_asc(contest_problem::Column::Position)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ContestProblemResponse::from)
        .collect();

    let derived = state.engine.contest_state(id).ok().map(|v| v.state);
    Ok(Json(ContestResponse::from_model(model, problems, derived)))
}

#[utoipa::path(
    get,
    path = "/{id}/state",
    tag = "Contests",
    operation_id = "getContestState",
    summary = "Get the derived contest state",
    description = "Returns the current lifecycle state plus the countdown boundaries derived from it, sampled at the server clock. Nothing is ticked or persisted by this read.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Derived state view", body = StateView),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "Contest halted for corrupt stored state (CONTEST_HALTED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _actor), fields(id))]
pub async fn get_contest_state(
    _actor: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StateView>, AppError> {
    Ok(Json(state.engine.contest_state(id)?))
}

#[utoipa::path(
    post,
    path = "/{id}/join",
    tag = "Contests",
    operation_id = "joinContest",
    summary = "Join a contest",
    description = "Joins the caller as a competitor or spectator. Competitor entry requires the Participant role and closes once the late-join grace window has passed; spectators may join any non-terminal contest.",
    params(("id" = i32, Path, description = "Contest ID")),
    request_body = JoinContestRequest,
    responses(
        (status = 201, description = "Joined", body = ParticipantResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Join window closed or already joined (JOIN_CLOSED, CONFLICT)", body = ErrorBody),
        (status = 503, description = "Contest halted for corrupt stored state (CONTEST_HALTED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, actor, payload), fields(id, participant_id = actor.actor_id))]
pub async fn join_contest(
    actor: AuthActor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<JoinContestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.kind.is_competitor() && actor.role != Role::Participant {
        return Err(AppError::PermissionDenied);
    }

    let request = JoinRequest {
        participant_id: actor.actor_id,
        display_name: actor.display_name.clone(),
        kind: payload.kind,
        rating: actor.rating,
    };
    let outcome = state.engine.join(id, request).await?;

    let txn = state.db.begin().await?;
    persist::insert_participant(&txn, id, &outcome.participant).await?;
    if let Some(facts) = &outcome.facts_changed {
        persist::update_facts(&txn, id, facts).await?;
    }
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(ParticipantResponse::from_entry(id, &outcome.participant)),
    ))
}

async fn find_contest<C: ConnectionTrait>(db: &C, id: i32) -> Result<contest::Model, AppError> {
    contest::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Contest not found".into()))
}
