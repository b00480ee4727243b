use common::ContestState;
use serde::Serialize;

use super::verdict::VerdictResponse;

/// Result of an applied admin command.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminCommandResponse {
    pub contest_id: i32,
    /// Contest state after the command.
    pub state: ContestState,
    /// Correction record appended by a Rejudge; null for other commands.
    pub correction: Option<VerdictResponse>,
}
