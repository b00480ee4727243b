use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info};

use common::{AdminCommand, ContestState, ParticipantKind, Verdict};

use crate::config::{ContestConfig, ProblemSlot, validate_problems};
use crate::error::{EngineError, RejectReason};
use crate::ledger::{Ledger, PendingRecord, SubmissionRecord};
use crate::lifecycle::{self, ClockCommand, LifecycleFacts};
use crate::ranking::{self, StandingsPage};

/// A registered participant of one contest.
#[derive(Clone, Debug)]
pub struct ParticipantEntry {
    pub participant_id: i32,
    pub display_name: String,
    pub kind: ParticipantKind,
    pub joined_at: DateTime<Utc>,
    /// Externally maintained rating; only feeds the badge tier.
    pub rating: Option<i32>,
    pub disqualified: bool,
}

/// Join request before the cell stamps the join time.
#[derive(Clone, Debug)]
pub struct JoinRequest {
    pub participant_id: i32,
    pub display_name: String,
    pub kind: ParticipantKind,
    pub rating: Option<i32>,
}

/// Judged verdict delivered by the judging collaborator, before gating.
#[derive(Clone, Debug)]
pub struct VerdictInput {
    pub participant_id: i32,
    pub problem_id: i32,
    pub verdict: Verdict,
    pub fraction: Option<f64>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SubmitOutcome {
    pub record: Arc<SubmissionRecord>,
    /// New lifecycle facts if this call also moved the clock.
    pub facts_changed: Option<LifecycleFacts>,
}

#[derive(Debug)]
pub struct JoinOutcome {
    pub participant: ParticipantEntry,
    pub facts_changed: Option<LifecycleFacts>,
}

pub struct AdminOutcome {
    pub state: ContestState,
    pub facts: LifecycleFacts,
    /// Correction appended by a rejudge, for persistence.
    pub rejudge: Option<Arc<SubmissionRecord>>,
    /// Participant row touched by a disqualification, for persistence.
    pub disqualified: Option<ParticipantEntry>,
}

/// Point-in-time countdown view. Derived from the facts and the clock on
/// every call; no timer object exists anywhere in the core.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct StateView {
    pub contest_id: i32,
    pub state: ContestState,
    pub now: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub effective_end: Option<DateTime<Utc>>,
    pub freeze_point: Option<DateTime<Utc>>,
    pub remaining_seconds: Option<i64>,
}

/// All runtime state of one contest.
///
/// Writers (joins, verdicts, admin commands, ticks) serialize through the
/// async `gate`: take it, apply due clock transitions, apply the mutation,
/// publish the facts, release. No I/O ever happens under the gate. Readers
/// never take it; they project the current state from the published facts
/// and fold a ledger snapshot outside every lock, so standings reads cannot
/// block ingestion.
#[derive(Debug)]
pub struct ContestCell {
    pub contest_id: i32,
    config: ContestConfig,
    /// Sorted by column position at construction.
    problems: Vec<ProblemSlot>,
    gate: Mutex<LifecycleFacts>,
    published: RwLock<LifecycleFacts>,
    participants: RwLock<HashMap<i32, ParticipantEntry>>,
    ledger: Ledger,
    /// Set once when an integrity violation is found; every operation on a
    /// halted contest fails with `Corrupt` while other contests keep going.
    halted: OnceLock<String>,
}

impl ContestCell {
    pub(crate) fn new(
        contest_id: i32,
        config: ContestConfig,
        mut problems: Vec<ProblemSlot>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        validate_problems(&problems)?;
        problems.sort_by_key(|p| p.position);
        Ok(Self {
            contest_id,
            config,
            problems,
            gate: Mutex::new(LifecycleFacts::default()),
            published: RwLock::new(LifecycleFacts::default()),
            participants: RwLock::new(HashMap::new()),
            ledger: Ledger::new(),
            halted: OnceLock::new(),
        })
    }

    /// Rebuilds a cell from durable rows, re-checking every construction
    /// and append-time invariant. Any violation is a `Corrupt` error; the
    /// caller quarantines the contest instead of guessing a repair.
    pub(crate) fn restore(
        contest_id: i32,
        config: ContestConfig,
        mut problems: Vec<ProblemSlot>,
        facts: LifecycleFacts,
        participants: Vec<ParticipantEntry>,
        records: Vec<SubmissionRecord>,
    ) -> Result<Self, EngineError> {
        let corrupt = |detail: String| EngineError::Corrupt { contest_id, detail };

        config.validate().map_err(|e| corrupt(e.to_string()))?;
        validate_problems(&problems).map_err(|e| corrupt(e.to_string()))?;
        problems.sort_by_key(|p| p.position);

        let mut roster = HashMap::new();
        for participant in participants {
            let id = participant.participant_id;
            if roster.insert(id, participant).is_some() {
                return Err(corrupt(format!("participant {id} stored twice")));
            }
        }

        let problem_ids: HashSet<i32> = problems.iter().map(|p| p.problem_id).collect();
        for record in &records {
            if !problem_ids.contains(&record.problem_id) {
                return Err(corrupt(format!(
                    "record {} references unknown problem {}",
                    record.seq, record.problem_id
                )));
            }
            if !roster.contains_key(&record.participant_id) {
                return Err(corrupt(format!(
                    "record {} references unknown participant {}",
                    record.seq, record.participant_id
                )));
            }
        }

        let ledger = Ledger::restore(contest_id, records)?;
        if let Some(cutoff) = facts.freeze_cutoff
            && cutoff > ledger.head()
        {
            return Err(corrupt(format!(
                "freeze cutoff {cutoff} beyond ledger head {}",
                ledger.head()
            )));
        }

        Ok(Self {
            contest_id,
            config,
            problems,
            gate: Mutex::new(facts),
            published: RwLock::new(facts),
            participants: RwLock::new(roster),
            ledger,
            halted: OnceLock::new(),
        })
    }

    /// Shell for a contest whose stored state failed validation: it stays
    /// addressable so callers get the alarm, but every operation fails.
    pub(crate) fn quarantined(
        contest_id: i32,
        config: ContestConfig,
        problems: Vec<ProblemSlot>,
        detail: String,
    ) -> Self {
        let halted = OnceLock::new();
        let _ = halted.set(detail);
        Self {
            contest_id,
            config,
            problems,
            gate: Mutex::new(LifecycleFacts::default()),
            published: RwLock::new(LifecycleFacts::default()),
            participants: RwLock::new(HashMap::new()),
            ledger: Ledger::new(),
            halted,
        }
    }

    pub fn config(&self) -> &ContestConfig {
        &self.config
    }

    pub fn problems(&self) -> &[ProblemSlot] {
        &self.problems
    }

    fn check_halted(&self) -> Result<(), EngineError> {
        match self.halted.get() {
            Some(detail) => Err(EngineError::Corrupt {
                contest_id: self.contest_id,
                detail: detail.clone(),
            }),
            None => Ok(()),
        }
    }

    fn publish(&self, facts: LifecycleFacts) {
        *self.published.write().expect("facts lock poisoned") = facts;
    }

    pub(crate) fn published_facts(&self) -> LifecycleFacts {
        *self.published.read().expect("facts lock poisoned")
    }

    fn participants_sorted(&self) -> Vec<ParticipantEntry> {
        let mut list: Vec<ParticipantEntry> = self
            .participants
            .read()
            .expect("roster lock poisoned")
            .values()
            .cloned()
            .collect();
        list.sort_by_key(|p| p.participant_id);
        list
    }

    /// Applies due clock transitions under the sequencer.
    pub(crate) async fn tick(&self, now: DateTime<Utc>) -> Result<Option<LifecycleFacts>, EngineError> {
        self.check_halted()?;
        let mut facts = self.gate.lock().await;
        if lifecycle::advance(&self.config, &mut facts, self.ledger.head(), now) {
            self.publish(*facts);
            debug!(
                contest_id = self.contest_id,
                state = %facts.state(),
                "clock transition applied"
            );
            Ok(Some(*facts))
        } else {
            Ok(None)
        }
    }

    pub(crate) async fn join(
        &self,
        request: JoinRequest,
        now: DateTime<Utc>,
    ) -> Result<JoinOutcome, EngineError> {
        self.check_halted()?;
        let mut facts = self.gate.lock().await;
        let advanced = lifecycle::advance(&self.config, &mut facts, self.ledger.head(), now);
        if advanced {
            self.publish(*facts);
        }

        if self
            .participants
            .read()
            .expect("roster lock poisoned")
            .contains_key(&request.participant_id)
        {
            return Err(EngineError::AlreadyJoined {
                contest_id: self.contest_id,
                participant_id: request.participant_id,
            });
        }

        match facts.state() {
            ContestState::Scheduled => {}
            ContestState::Live | ContestState::FrozenLive | ContestState::Paused => {
                if request.kind.is_competitor() {
                    // Inclusive at exactly start + grace; grace zero means
                    // no late joining at all.
                    let open = self.config.grace > Duration::zero()
                        && lifecycle::join_deadline(&self.config, &facts)
                            .is_some_and(|deadline| now <= deadline);
                    if !open {
                        return Err(EngineError::JoinClosed(self.contest_id));
                    }
                }
            }
            ContestState::Ended | ContestState::Cancelled => {
                return Err(EngineError::JoinClosed(self.contest_id));
            }
        }

        let participant = ParticipantEntry {
            participant_id: request.participant_id,
            display_name: request.display_name,
            kind: request.kind,
            joined_at: now,
            rating: request.rating,
            disqualified: false,
        };
        self.participants
            .write()
            .expect("roster lock poisoned")
            .insert(participant.participant_id, participant.clone());
        info!(
            contest_id = self.contest_id,
            participant_id = participant.participant_id,
            kind = %participant.kind,
            "participant joined"
        );
        Ok(JoinOutcome {
            participant,
            facts_changed: advanced.then(|| *facts),
        })
    }

    /// Admits one judged verdict into the ledger. Assigning the seq under
    /// the gate is the linearization point for concurrent submissions.
    pub(crate) async fn submit(
        &self,
        input: VerdictInput,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, EngineError> {
        self.check_halted()?;
        validate_fraction(input.verdict, input.fraction)?;
        if !self
            .problems
            .iter()
            .any(|p| p.problem_id == input.problem_id)
        {
            return Err(EngineError::UnknownProblem {
                contest_id: self.contest_id,
                problem_id: input.problem_id,
            });
        }

        let mut facts = self.gate.lock().await;
        let advanced = lifecycle::advance(&self.config, &mut facts, self.ledger.head(), now);
        if advanced {
            self.publish(*facts);
        }

        match facts.state() {
            ContestState::Live | ContestState::FrozenLive => {}
            ContestState::Cancelled => {
                return Err(EngineError::Rejected(RejectReason::ContestCancelled));
            }
            ContestState::Scheduled | ContestState::Paused | ContestState::Ended => {
                return Err(EngineError::Rejected(RejectReason::ContestNotLive));
            }
        }

        {
            let roster = self.participants.read().expect("roster lock poisoned");
            let participant =
                roster
                    .get(&input.participant_id)
                    .filter(|p| p.kind.is_competitor())
                    .ok_or(EngineError::UnknownParticipant {
                        contest_id: self.contest_id,
                        participant_id: input.participant_id,
                    })?;
            if participant.disqualified {
                return Err(EngineError::Rejected(RejectReason::ParticipantDisqualified));
            }
        }

        let started_at = facts.started_at.ok_or(EngineError::Rejected(RejectReason::ContestNotLive))?;
        let deadline = lifecycle::submission_deadline(&self.config, &facts);
        let in_window = input.submitted_at >= started_at
            && deadline.is_some_and(|d| input.submitted_at < d);
        if !in_window {
            return Err(EngineError::Rejected(RejectReason::OutsideWindow));
        }

        // Contest time of the submission, pauses excluded, fixed forever.
        let elapsed =
            (input.submitted_at - started_at - facts.total_paused).max(Duration::zero());
        let record = self.ledger.append(
            self.contest_id,
            PendingRecord {
                participant_id: input.participant_id,
                problem_id: input.problem_id,
                verdict: input.verdict,
                fraction: input.fraction,
                submitted_at: input.submitted_at,
                elapsed,
                supersedes: None,
            },
        );
        debug!(
            contest_id = self.contest_id,
            seq = record.seq,
            participant_id = record.participant_id,
            problem_id = record.problem_id,
            verdict = %record.verdict,
            "verdict admitted"
        );
        Ok(SubmitOutcome {
            record,
            facts_changed: advanced.then(|| *facts),
        })
    }

    pub(crate) async fn admin(
        &self,
        command: &AdminCommand,
        now: DateTime<Utc>,
    ) -> Result<AdminOutcome, EngineError> {
        self.check_halted()?;
        let mut facts = self.gate.lock().await;
        lifecycle::advance(&self.config, &mut facts, self.ledger.head(), now);

        let mut rejudge = None;
        let mut disqualified = None;
        match command {
            AdminCommand::Disqualify { participant_id } => {
                disqualified = Some(self.disqualify_locked(*participant_id)?);
            }
            AdminCommand::Rejudge {
                seq,
                verdict,
                fraction,
            } => {
                rejudge = Some(self.rejudge_locked(&facts, *seq, *verdict, *fraction)?);
            }
            AdminCommand::Start => {
                lifecycle::apply(&self.config, &mut facts, self.ledger.head(), now, ClockCommand::Start)?;
            }
            AdminCommand::Pause => {
                lifecycle::apply(&self.config, &mut facts, self.ledger.head(), now, ClockCommand::Pause)?;
            }
            AdminCommand::Resume => {
                lifecycle::apply(&self.config, &mut facts, self.ledger.head(), now, ClockCommand::Resume)?;
            }
            AdminCommand::FreezeNow => {
                lifecycle::apply(&self.config, &mut facts, self.ledger.head(), now, ClockCommand::FreezeNow)?;
            }
            AdminCommand::End => {
                lifecycle::apply(&self.config, &mut facts, self.ledger.head(), now, ClockCommand::End)?;
            }
            AdminCommand::Cancel => {
                lifecycle::apply(&self.config, &mut facts, self.ledger.head(), now, ClockCommand::Cancel)?;
            }
        }
        self.publish(*facts);
        info!(
            contest_id = self.contest_id,
            command = command.name(),
            state = %facts.state(),
            "admin command applied"
        );
        Ok(AdminOutcome {
            state: facts.state(),
            facts: *facts,
            rejudge,
            disqualified,
        })
    }

    /// State-independent roster mutation; idempotent on repeat.
    fn disqualify_locked(&self, participant_id: i32) -> Result<ParticipantEntry, EngineError> {
        let mut roster = self.participants.write().expect("roster lock poisoned");
        let entry = roster
            .get_mut(&participant_id)
            .ok_or(EngineError::UnknownParticipant {
                contest_id: self.contest_id,
                participant_id,
            })?;
        entry.disqualified = true;
        Ok(entry.clone())
    }

    /// Appends a correction superseding an existing root record. The
    /// original submission time and elapsed carry over: a rejudge corrects
    /// the verdict, never the clock.
    fn rejudge_locked(
        &self,
        facts: &LifecycleFacts,
        seq: u64,
        verdict: Verdict,
        fraction: Option<f64>,
    ) -> Result<Arc<SubmissionRecord>, EngineError> {
        let state = facts.state();
        if state == ContestState::Cancelled {
            return Err(EngineError::InvalidTransition {
                state,
                command: "Rejudge",
            });
        }
        validate_fraction(verdict, fraction)?;
        let root = self
            .ledger
            .get(seq)
            .ok_or(EngineError::UnknownRecord {
                contest_id: self.contest_id,
                seq,
            })?;
        if root.supersedes.is_some() {
            return Err(EngineError::InvalidVerdict(format!(
                "seq {seq} is itself a correction; rejudge its root instead"
            )));
        }
        Ok(self.ledger.append(
            self.contest_id,
            PendingRecord {
                participant_id: root.participant_id,
                problem_id: root.problem_id,
                verdict,
                fraction,
                submitted_at: root.submitted_at,
                elapsed: root.elapsed,
                supersedes: Some(seq),
            },
        ))
    }

    /// Computes one standings page without touching the sequencer.
    ///
    /// Clock transitions are projected onto a copy of the published facts;
    /// the projection is deterministic in `(facts, head, now)`, so the next
    /// mutating advance records exactly what the read anticipated.
    pub(crate) fn standings_page(
        &self,
        privileged: bool,
        page: u64,
        per_page: u64,
        pinned: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<StandingsPage, EngineError> {
        self.check_halted()?;
        let head = self.ledger.head();
        let mut facts = self.published_facts();
        lifecycle::advance(&self.config, &mut facts, head, now);

        let gate = facts.freeze_gate();
        let base = if privileged { head } else { gate.unwrap_or(head) };
        let frozen = !privileged && gate.is_some();
        let cutoff = match pinned {
            Some(cutoff) if cutoff > head => {
                return Err(EngineError::CutoffBeyondHead { cutoff, head });
            }
            Some(cutoff) => {
                // The ledger is never compacted; this guards the invariant
                // rather than an expected path.
                if cutoff + 1 < self.ledger.oldest() {
                    return Err(EngineError::StaleCutoff {
                        cutoff,
                        oldest: self.ledger.oldest(),
                    });
                }
                cutoff.min(base)
            }
            None => base,
        };

        let participants = self.participants_sorted();
        let snapshot = self.ledger.snapshot(cutoff);
        let entries = ranking::standings(&self.config, &self.problems, &participants, &snapshot);
        Ok(ranking::paginate(
            self.contest_id,
            cutoff,
            frozen,
            page,
            per_page,
            entries,
        ))
    }

    /// Countdown view for presentation collaborators.
    pub(crate) fn state_view(&self, now: DateTime<Utc>) -> Result<StateView, EngineError> {
        self.check_halted()?;
        let mut facts = self.published_facts();
        lifecycle::advance(&self.config, &mut facts, self.ledger.head(), now);
        let state = facts.state();

        // While paused the effective end keeps receding in wall time.
        let pause_spill = facts.paused_at.map_or(Duration::zero(), |p| now - p);
        let effective_end =
            lifecycle::effective_end(&self.config, &facts).map(|end| end + pause_spill);
        let freeze_point = facts
            .frozen_at
            .or_else(|| lifecycle::freeze_point(&self.config, &facts).map(|f| f + pause_spill));
        let remaining_seconds = match state {
            ContestState::Live | ContestState::FrozenLive | ContestState::Paused => {
                effective_end.map(|end| (end - now).num_seconds().max(0))
            }
            ContestState::Scheduled => {
                Some((self.config.start_time - now).num_seconds().max(0))
            }
            ContestState::Ended | ContestState::Cancelled => None,
        };

        Ok(StateView {
            contest_id: self.contest_id,
            state,
            now,
            start_time: self.config.start_time,
            started_at: facts.started_at,
            effective_end,
            freeze_point,
            remaining_seconds,
        })
    }
}

fn validate_fraction(verdict: Verdict, fraction: Option<f64>) -> Result<(), EngineError> {
    match (verdict.requires_fraction(), fraction) {
        (true, Some(f)) if (0.0..=1.0).contains(&f) => Ok(()),
        (true, Some(f)) => Err(EngineError::InvalidVerdict(format!(
            "fraction {f} outside [0, 1]"
        ))),
        (true, None) => Err(EngineError::InvalidVerdict(
            "partial verdict requires a fraction".into(),
        )),
        (false, Some(_)) => Err(EngineError::InvalidVerdict(
            "fraction is only valid on partial verdicts".into(),
        )),
        (false, None) => Ok(()),
    }
}
