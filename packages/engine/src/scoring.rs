use serde::{Deserialize, Serialize};

use common::ScoringMode;

use crate::config::ContestConfig;
use crate::ledger::SubmissionRecord;

/// Per-problem cell on the scoreboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum CellState {
    Unattempted,
    Attempted,
    Solved,
    SolvedWithPenalty,
}

/// One submission chain of a participant-problem cell: the competitor's
/// original record plus any corrections, seq ascending, all at or below the
/// fold cutoff.
#[derive(Clone, Debug)]
pub struct Chain<'a> {
    pub root: &'a SubmissionRecord,
    pub corrections: Vec<&'a SubmissionRecord>,
}

impl<'a> Chain<'a> {
    pub fn root_seq(&self) -> u64 {
        self.root.seq
    }

    /// Effective record: the latest correction, or the root itself.
    pub fn head(&self) -> &'a SubmissionRecord {
        self.corrections.last().copied().unwrap_or(self.root)
    }

    /// Best credit ever recorded on the chain. Corrections that lower a
    /// fraction do not claw back credit under partial scoring.
    pub fn max_credit(&self) -> f64 {
        self.corrections
            .iter()
            .fold(self.root.credit(), |best, c| best.max(c.credit()))
    }
}

/// Outcome of folding one participant-problem cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProblemOutcome {
    pub points: i64,
    /// Whole minutes, rounded down. Zero outside ICPC mode.
    pub penalty_minutes: i64,
    pub state: CellState,
    /// Competitor submissions counted for the cell (corrections are not
    /// attempts; post-solve submissions under ICPC are not counted either).
    pub attempts: u32,
    /// Root seq of the submission that fixed the final points, for the
    /// score-attained tie-break.
    pub attained_seq: Option<u64>,
}

impl ProblemOutcome {
    fn untouched() -> Self {
        Self {
            points: 0,
            penalty_minutes: 0,
            state: CellState::Unattempted,
            attempts: 0,
            attained_seq: None,
        }
    }
}

/// Folds one cell's chains (root-seq ascending) under the contest's mode.
pub fn fold_problem(config: &ContestConfig, weight: i64, chains: &[Chain<'_>]) -> ProblemOutcome {
    match config.scoring {
        ScoringMode::Icpc => fold_icpc(config, weight, chains),
        ScoringMode::Codeforces => fold_codeforces(config, weight, chains),
        ScoringMode::CustomPartial => fold_partial(weight, chains),
    }
}

/// First accept scores full weight; penalty = wrongs-before-accept times the
/// configured cost plus the elapsed time at the accept, in whole minutes.
/// Records after the solve are kept in the ledger but ignored here.
fn fold_icpc(config: &ContestConfig, weight: i64, chains: &[Chain<'_>]) -> ProblemOutcome {
    let mut wrongs: u32 = 0;
    for chain in chains {
        let head = chain.head();
        if head.verdict.is_accepted() {
            let penalty = config.wrong_penalty * wrongs as i32 + head.elapsed;
            return ProblemOutcome {
                points: weight,
                penalty_minutes: penalty.num_minutes(),
                state: if wrongs == 0 {
                    CellState::Solved
                } else {
                    CellState::SolvedWithPenalty
                },
                attempts: wrongs + 1,
                attained_seq: Some(chain.root_seq()),
            };
        }
        wrongs += 1;
    }
    ProblemOutcome {
        state: if wrongs == 0 {
            CellState::Unattempted
        } else {
            CellState::Attempted
        },
        attempts: wrongs,
        ..ProblemOutcome::untouched()
    }
}

/// Score decays linearly from full weight at elapsed zero to the configured
/// floor at the scheduled duration (clamped beyond); every wrong before the
/// accept deducts a fixed percentage of the weight; floored at zero. The
/// penalty column stays zero, time cost is folded into the score.
fn fold_codeforces(config: &ContestConfig, weight: i64, chains: &[Chain<'_>]) -> ProblemOutcome {
    let mut wrongs: i64 = 0;
    for chain in chains {
        let head = chain.head();
        if head.verdict.is_accepted() {
            let duration_s = config.duration.num_seconds().max(1);
            let elapsed_s = head.elapsed.num_seconds().clamp(0, duration_s);
            let floor = weight * i64::from(config.decay_floor_pct) / 100;
            let decayed = weight - (weight - floor) * elapsed_s / duration_s;
            let deduction = wrongs * (weight * i64::from(config.wrong_deduction_pct) / 100);
            return ProblemOutcome {
                points: (decayed - deduction).max(0),
                penalty_minutes: 0,
                state: if wrongs == 0 {
                    CellState::Solved
                } else {
                    CellState::SolvedWithPenalty
                },
                attempts: wrongs as u32 + 1,
                attained_seq: Some(chain.root_seq()),
            };
        }
        wrongs += 1;
    }
    ProblemOutcome {
        state: if wrongs == 0 {
            CellState::Unattempted
        } else {
            CellState::Attempted
        },
        attempts: wrongs as u32,
        ..ProblemOutcome::untouched()
    }
}

/// Best fraction across every record of the cell counts, rounded to whole
/// points. The maximum is monotonic: later lower fractions, corrections
/// included, never reduce credited points. No time penalty.
fn fold_partial(weight: i64, chains: &[Chain<'_>]) -> ProblemOutcome {
    let mut points: i64 = 0;
    let mut attained_seq = None;
    let mut full_credit = false;
    for chain in chains {
        let credit = chain.max_credit();
        let chain_points = (weight as f64 * credit).round() as i64;
        if chain_points > points {
            points = chain_points;
            attained_seq = Some(chain.root_seq());
        }
        if credit >= 1.0 {
            full_credit = true;
        }
    }
    let state = if chains.is_empty() {
        CellState::Unattempted
    } else if full_credit {
        CellState::Solved
    } else {
        CellState::Attempted
    };
    ProblemOutcome {
        points,
        penalty_minutes: 0,
        state,
        attempts: chains.len() as u32,
        attained_seq,
    }
}
