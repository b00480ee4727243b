use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/contests", contest_routes())
}

fn contest_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::contest::list_contests,
            handlers::contest::create_contest
        ))
        .routes(routes!(handlers::contest::get_contest))
        .routes(routes!(handlers::contest::get_contest_state))
        .routes(routes!(handlers::contest::join_contest))
        .routes(routes!(handlers::verdict::ingest_verdict))
        .routes(routes!(handlers::admin::apply_admin_command))
        .routes(routes!(handlers::standings::get_standings))
}
