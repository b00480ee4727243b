use chrono::{DateTime, Utc};
use common::Verdict;
use engine::SubmissionRecord;
use serde::{Deserialize, Serialize};

/// Judged result pushed by the judging collaborator. Code never travels
/// here; only the outcome does.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct IngestVerdictRequest {
    #[schema(example = 7)]
    pub participant_id: i32,
    #[schema(example = 42)]
    pub problem_id: i32,
    pub verdict: Verdict,
    /// Credit fraction in [0, 1]; required iff the verdict is Partial.
    #[serde(default)]
    #[schema(example = 0.6)]
    pub fraction: Option<f64>,
    /// Instant the submission was made, as reported by the judge.
    pub submitted_at: DateTime<Utc>,
}

/// One sealed ledger record.
#[derive(Serialize, utoipa::ToSchema)]
pub struct VerdictResponse {
    pub contest_id: i32,
    /// Gap-free ledger position within the contest, starting at 1.
    #[schema(example = 17)]
    pub seq: u64,
    pub participant_id: i32,
    pub problem_id: i32,
    pub verdict: Verdict,
    pub fraction: Option<f64>,
    pub submitted_at: DateTime<Utc>,
    /// Pause-adjusted contest seconds at submission.
    #[schema(example = 2700)]
    pub elapsed_s: i64,
    /// Root seq this record corrects; null for original submissions.
    pub supersedes: Option<u64>,
}

impl From<&SubmissionRecord> for VerdictResponse {
    fn from(r: &SubmissionRecord) -> Self {
        Self {
            contest_id: r.contest_id,
            seq: r.seq,
            participant_id: r.participant_id,
            problem_id: r.problem_id,
            verdict: r.verdict,
            fraction: r.fraction,
            submitted_at: r.submitted_at,
            elapsed_s: r.elapsed.num_seconds(),
            supersedes: r.supersedes,
        }
    }
}
