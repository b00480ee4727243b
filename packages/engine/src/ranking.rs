use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use common::BadgeTier;

use crate::config::{ContestConfig, ProblemSlot};
use crate::contest::ParticipantEntry;
use crate::ledger::SubmissionRecord;
use crate::scoring::{Chain, CellState, fold_problem};

/// One leaderboard cell, in column (problem position) order.
#[derive(Clone, Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CellView {
    pub problem_id: i32,
    pub state: CellState,
    pub points: i64,
    pub attempts: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StandingsEntry {
    /// 1-based position under the total tie-break order.
    pub rank: u32,
    pub participant_id: i32,
    pub display_name: String,
    /// Rating-derived tier; decoration only, never a sort key.
    pub badge: Option<BadgeTier>,
    pub total_score: i64,
    pub total_penalty: i64,
    pub cells: Vec<CellView>,
}

/// Deterministic page of the standings at a pinned ledger cutoff.
#[derive(Clone, Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StandingsPage {
    pub contest_id: i32,
    /// Ledger position this page was folded at. Pass it back as the pinned
    /// cutoff to keep paging through one consistent view.
    pub cutoff: u64,
    /// True when the freeze gate clipped this caller's view.
    pub frozen: bool,
    pub page: u64,
    pub per_page: u64,
    pub total_entries: u64,
    pub total_pages: u64,
    pub entries: Vec<StandingsEntry>,
}

struct Folded {
    participant_id: i32,
    display_name: String,
    badge: Option<BadgeTier>,
    total_score: i64,
    total_penalty: i64,
    /// Root seq of the submission that fixed the final total, for the
    /// third tie-break key.
    attained: Option<u64>,
    cells: Vec<CellView>,
}

/// Folds a ledger snapshot into fully ordered standings.
///
/// Pure function of its inputs: the same config, problem columns,
/// participant rows and snapshot produce byte-identical output. Spectators
/// and disqualified participants fold to no row; their records stay in the
/// snapshot untouched.
pub fn standings(
    config: &ContestConfig,
    problems: &[ProblemSlot],
    participants: &[ParticipantEntry],
    snapshot: &[Arc<SubmissionRecord>],
) -> Vec<StandingsEntry> {
    // Group the snapshot into per-cell correction chains. Corrections
    // always follow their root in seq order, so one pass suffices.
    let mut cells: HashMap<(i32, i32), Vec<Chain<'_>>> = HashMap::new();
    let mut locate: HashMap<u64, (i32, i32, usize)> = HashMap::new();
    for record in snapshot {
        match record.supersedes {
            None => {
                let key = (record.participant_id, record.problem_id);
                let chains = cells.entry(key).or_default();
                locate.insert(record.seq, (key.0, key.1, chains.len()));
                chains.push(Chain {
                    root: record.as_ref(),
                    corrections: Vec::new(),
                });
            }
            Some(root_seq) => {
                // A correction inside the snapshot implies its root is too;
                // the ledger validates chains on append and restore.
                if let Some(&(participant_id, problem_id, idx)) = locate.get(&root_seq)
                    && let Some(chains) = cells.get_mut(&(participant_id, problem_id))
                    && let Some(chain) = chains.get_mut(idx)
                {
                    chain.corrections.push(record.as_ref());
                }
            }
        }
    }

    let mut rows: Vec<Folded> = participants
        .iter()
        .filter(|p| p.kind.is_competitor() && !p.disqualified)
        .map(|participant| {
            let mut total_score = 0i64;
            let mut total_penalty = 0i64;
            let mut attained: Option<u64> = None;
            let mut row_cells = Vec::with_capacity(problems.len());
            for problem in problems {
                let chains = cells
                    .get(&(participant.participant_id, problem.problem_id))
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let outcome = fold_problem(config, problem.weight, chains);
                total_score += outcome.points;
                total_penalty += outcome.penalty_minutes;
                if outcome.points > 0
                    && let Some(seq) = outcome.attained_seq
                {
                    // The total settles when its last contributing cell does.
                    attained = Some(attained.map_or(seq, |a| a.max(seq)));
                }
                row_cells.push(CellView {
                    problem_id: problem.problem_id,
                    state: outcome.state,
                    points: outcome.points,
                    attempts: outcome.attempts,
                });
            }
            Folded {
                participant_id: participant.participant_id,
                display_name: participant.display_name.clone(),
                badge: participant.rating.map(BadgeTier::from_rating),
                total_score,
                total_penalty,
                attained,
                cells: row_cells,
            }
        })
        .collect();

    // Score desc, penalty asc, score attained earlier first. Participant id
    // closes the order for rows with no counted score, where all three
    // leading keys tie at zero.
    rows.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then_with(|| a.total_penalty.cmp(&b.total_penalty))
            .then_with(|| {
                a.attained
                    .unwrap_or(u64::MAX)
                    .cmp(&b.attained.unwrap_or(u64::MAX))
            })
            .then_with(|| a.participant_id.cmp(&b.participant_id))
    });

    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| StandingsEntry {
            rank: idx as u32 + 1,
            participant_id: row.participant_id,
            display_name: row.display_name,
            badge: row.badge,
            total_score: row.total_score,
            total_penalty: row.total_penalty,
            cells: row.cells,
        })
        .collect()
}

/// Slices ordered standings into one page. An out-of-range page is an empty
/// page, not an error; `total_pages` never drops below 1 so clients can
/// always render a pager.
pub fn paginate(
    contest_id: i32,
    cutoff: u64,
    frozen: bool,
    page: u64,
    per_page: u64,
    entries: Vec<StandingsEntry>,
) -> StandingsPage {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_entries = entries.len() as u64;
    let total_pages = total_entries.div_ceil(per_page).max(1);
    let start = (page - 1).saturating_mul(per_page) as usize;
    let entries: Vec<StandingsEntry> = entries
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();
    StandingsPage {
        contest_id,
        cutoff,
        frozen,
        page,
        per_page,
        total_entries,
        total_pages,
        entries,
    }
}
