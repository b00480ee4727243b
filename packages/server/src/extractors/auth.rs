use axum::{extract::FromRequestParts, http::request::Parts};
use std::str::FromStr;

use common::{AdminCommand, Role};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated caller extracted from the `Authorization: Bearer <token>`
/// header.
///
/// Add this as a handler parameter to require authentication. Capability
/// checks happen via the `require_*` methods in the handler body.
pub struct AuthActor {
    pub actor_id: i32,
    pub display_name: String,
    pub role: Role,
    pub rating: Option<i32>,
}

impl AuthActor {
    /// Contest registration requires an authoring tier.
    pub fn require_author(&self) -> Result<(), AppError> {
        if self.role.may_author_contests() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    /// Verdict ingestion is reserved to the judging service tiers.
    pub fn require_ingest(&self) -> Result<(), AppError> {
        if self.role.may_ingest_verdicts() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    /// Per-command admin capability check.
    pub fn require_command(&self, command: &AdminCommand) -> Result<(), AppError> {
        if self.role.may_issue(command) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    /// Whether this caller keeps seeing the live board during a freeze.
    pub fn privileged_view(&self) -> bool {
        self.role.sees_live_when_frozen()
    }
}

impl FromRequestParts<AppState> for AuthActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(&state.config.auth.jwt_secret, token)
            .map_err(|_| AppError::TokenInvalid)?;
        let role = Role::from_str(&claims.role).map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthActor {
            actor_id: claims.uid,
            display_name: claims.sub,
            role,
            rating: claims.rating,
        })
    }
}
