use chrono::{DateTime, Duration, Utc};
use common::Verdict;
use std::sync::{Arc, RwLock};

use crate::error::EngineError;

/// One judged submission. Immutable once appended; corrections append a new
/// record pointing back at the chain root instead of mutating.
#[derive(Clone, Debug)]
pub struct SubmissionRecord {
    pub contest_id: i32,
    /// Gap-free position in the contest ledger, starting at 1. Assigning it
    /// is the linearization point for concurrent submissions.
    pub seq: u64,
    pub participant_id: i32,
    pub problem_id: i32,
    pub verdict: Verdict,
    /// Credit fraction in [0, 1]; present iff the verdict is Partial.
    pub fraction: Option<f64>,
    pub submitted_at: DateTime<Utc>,
    /// Pause-adjusted contest time of the submission, fixed at append so
    /// scoring folds stay pure.
    pub elapsed: Duration,
    /// Root seq of the chain this record corrects, if any.
    pub supersedes: Option<u64>,
}

impl SubmissionRecord {
    /// Chain root: the corrected seq for rejudges, own seq otherwise.
    pub fn root_seq(&self) -> u64 {
        self.supersedes.unwrap_or(self.seq)
    }

    /// Credit fraction under partial scoring.
    pub fn credit(&self) -> f64 {
        match self.verdict {
            Verdict::Accepted => 1.0,
            Verdict::Partial => self.fraction.unwrap_or(0.0).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// Record fields before the ledger assigns a seq.
#[derive(Clone, Debug)]
pub struct PendingRecord {
    pub participant_id: i32,
    pub problem_id: i32,
    pub verdict: Verdict,
    pub fraction: Option<f64>,
    pub submitted_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub supersedes: Option<u64>,
}

/// Append-only submission ledger of one contest.
///
/// Appends only happen under the contest sequencer, so they never race each
/// other; the lock exists to order readers against the append. Readers take
/// a bounded prefix of `Arc` pointers and fold outside the lock, so standings
/// computation never blocks ingestion.
#[derive(Debug, Default)]
pub struct Ledger {
    records: RwLock<Vec<Arc<SubmissionRecord>>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from stored rows, re-checking the append-time
    /// invariants: gap-free seq from 1 and corrections pointing at an
    /// earlier, uncorrected root.
    pub fn restore(contest_id: i32, records: Vec<SubmissionRecord>) -> Result<Self, EngineError> {
        for (idx, record) in records.iter().enumerate() {
            let expected = idx as u64 + 1;
            if record.seq != expected {
                return Err(EngineError::Corrupt {
                    contest_id,
                    detail: format!("ledger gap: expected seq {expected}, found {}", record.seq),
                });
            }
            if let Some(root) = record.supersedes {
                if root == 0 || root >= record.seq {
                    return Err(EngineError::Corrupt {
                        contest_id,
                        detail: format!("record {} supersedes out-of-range seq {root}", record.seq),
                    });
                }
                if records[root as usize - 1].supersedes.is_some() {
                    return Err(EngineError::Corrupt {
                        contest_id,
                        detail: format!(
                            "record {} supersedes {root}, which is itself a correction",
                            record.seq
                        ),
                    });
                }
            }
        }
        Ok(Self {
            records: RwLock::new(records.into_iter().map(Arc::new).collect()),
        })
    }

    /// Latest assigned seq; 0 for an empty ledger.
    pub fn head(&self) -> u64 {
        self.records.read().expect("ledger lock poisoned").len() as u64
    }

    /// Oldest retained seq. The ledger is never compacted, so this is
    /// constant; it exists so the stale-cutoff guard reads against the real
    /// floor instead of a literal.
    pub fn oldest(&self) -> u64 {
        1
    }

    /// Appends with the next seq and returns the sealed record. Must be
    /// called under the contest sequencer.
    pub fn append(&self, contest_id: i32, pending: PendingRecord) -> Arc<SubmissionRecord> {
        let mut records = self.records.write().expect("ledger lock poisoned");
        let record = Arc::new(SubmissionRecord {
            contest_id,
            seq: records.len() as u64 + 1,
            participant_id: pending.participant_id,
            problem_id: pending.problem_id,
            verdict: pending.verdict,
            fraction: pending.fraction,
            submitted_at: pending.submitted_at,
            elapsed: pending.elapsed,
            supersedes: pending.supersedes,
        });
        records.push(record.clone());
        record
    }

    pub fn get(&self, seq: u64) -> Option<Arc<SubmissionRecord>> {
        let records = self.records.read().expect("ledger lock poisoned");
        seq.checked_sub(1)
            .and_then(|idx| records.get(idx as usize))
            .cloned()
    }

    /// Pointer-copies the prefix up to `cutoff`, clamped to the head.
    pub fn snapshot(&self, cutoff: u64) -> Vec<Arc<SubmissionRecord>> {
        let records = self.records.read().expect("ledger lock poisoned");
        let len = (cutoff as usize).min(records.len());
        records[..len].to_vec()
    }
}
