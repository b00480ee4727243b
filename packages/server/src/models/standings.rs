use serde::Deserialize;

/// Query parameters of a standings read.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct StandingsQuery {
    /// Page number (1-indexed).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Rows per page (1-100, default 50).
    #[param(example = 50)]
    pub per_page: Option<u64>,
    /// Pin the fold at this ledger seq to keep paging through one
    /// consistent view. Non-privileged callers are additionally clamped
    /// to the freeze cutoff while the board is frozen.
    #[param(example = 17)]
    pub cutoff: Option<u64>,
}
