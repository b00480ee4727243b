//! Versioned API surface. Every operation the contest core exposes lives
//! under `/api/v1`; the OpenAPI paths collected here feed the docs mounted
//! in `lib.rs`.

mod v1;

use utoipa_axum::router::OpenApiRouter;

use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes())
}
