use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tracing::{error, info};

use common::{AdminCommand, Clock, ScoringMode};

use crate::config::{ContestConfig, ProblemSlot};
use crate::contest::{
    AdminOutcome, ContestCell, JoinOutcome, JoinRequest, ParticipantEntry, StateView,
    SubmitOutcome, VerdictInput,
};
use crate::error::EngineError;
use crate::ledger::SubmissionRecord;
use crate::lifecycle::LifecycleFacts;
use crate::ranking::StandingsPage;

/// Shared handle over every loaded contest.
///
/// The map stores only `Arc`s and each cell synchronizes itself, so
/// operations on different contests never contend and the handle is cheap
/// to clone into request handlers and background tasks.
#[derive(Clone)]
pub struct ContestEngine {
    contests: Arc<DashMap<i32, Arc<ContestCell>>>,
    clock: Arc<dyn Clock>,
}

impl ContestEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            contests: Arc::new(DashMap::new()),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn cell(&self, contest_id: i32) -> Result<Arc<ContestCell>, EngineError> {
        self.contests
            .get(&contest_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(EngineError::UnknownContest(contest_id))
    }

    /// Registers a fresh contest. Validation failures leave the map alone.
    pub fn create_contest(
        &self,
        contest_id: i32,
        config: ContestConfig,
        problems: Vec<ProblemSlot>,
    ) -> Result<(), EngineError> {
        let cell = Arc::new(ContestCell::new(contest_id, config, problems)?);
        match self.contests.entry(contest_id) {
            Entry::Occupied(_) => Err(EngineError::DuplicateContest(contest_id)),
            Entry::Vacant(slot) => {
                slot.insert(cell);
                info!(contest_id, "contest registered");
                Ok(())
            }
        }
    }

    /// Loads a contest from durable rows. Stored state that fails
    /// validation quarantines that one contest and raises the operator
    /// alarm; every other contest keeps running.
    pub fn restore_contest(
        &self,
        contest_id: i32,
        config: ContestConfig,
        problems: Vec<ProblemSlot>,
        facts: LifecycleFacts,
        participants: Vec<ParticipantEntry>,
        records: Vec<SubmissionRecord>,
    ) -> Result<(), EngineError> {
        let cell = match ContestCell::restore(
            contest_id,
            config.clone(),
            problems.clone(),
            facts,
            participants,
            records,
        ) {
            Ok(cell) => cell,
            Err(EngineError::Corrupt { detail, .. }) => {
                error!(
                    contest_id,
                    %detail,
                    "stored contest state failed validation, contest halted"
                );
                ContestCell::quarantined(contest_id, config, problems, detail)
            }
            Err(other) => return Err(other),
        };
        match self.contests.entry(contest_id) {
            Entry::Occupied(_) => Err(EngineError::DuplicateContest(contest_id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(cell));
                Ok(())
            }
        }
    }

    /// Registers a halted shell for a contest whose stored rows cannot even
    /// be mapped to engine types. The placeholder config is never read;
    /// every operation checks the halted flag first.
    pub fn quarantine_contest(&self, contest_id: i32, detail: String) {
        error!(
            contest_id,
            %detail,
            "stored contest state failed validation, contest halted"
        );
        let placeholder = ContestConfig {
            title: String::new(),
            start_time: self.clock.now(),
            duration: Duration::minutes(1),
            grace: Duration::zero(),
            freeze_offset: Duration::zero(),
            scoring: ScoringMode::Icpc,
            wrong_penalty: Duration::zero(),
            decay_floor_pct: 0,
            wrong_deduction_pct: 0,
            auto_end: false,
        };
        let cell = ContestCell::quarantined(contest_id, placeholder, Vec::new(), detail);
        self.contests.insert(contest_id, Arc::new(cell));
    }

    pub async fn join(
        &self,
        contest_id: i32,
        request: JoinRequest,
    ) -> Result<JoinOutcome, EngineError> {
        self.cell(contest_id)?.join(request, self.clock.now()).await
    }

    pub async fn submit_verdict(
        &self,
        contest_id: i32,
        input: VerdictInput,
    ) -> Result<SubmitOutcome, EngineError> {
        self.cell(contest_id)?.submit(input, self.clock.now()).await
    }

    pub async fn apply_admin(
        &self,
        contest_id: i32,
        command: &AdminCommand,
    ) -> Result<AdminOutcome, EngineError> {
        self.cell(contest_id)?.admin(command, self.clock.now()).await
    }

    /// Applies due clock transitions for one contest.
    pub async fn tick(&self, contest_id: i32) -> Result<Option<LifecycleFacts>, EngineError> {
        self.cell(contest_id)?.tick(self.clock.now()).await
    }

    /// Sweeps every contest and returns the facts of those whose clock
    /// moved, for persistence. Halted contests are skipped silently; the
    /// alarm already fired when they were loaded.
    pub async fn tick_all(&self) -> Vec<(i32, LifecycleFacts)> {
        let cells: Vec<Arc<ContestCell>> = self
            .contests
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut changed = Vec::new();
        for cell in cells {
            if let Ok(Some(facts)) = cell.tick(self.clock.now()).await {
                changed.push((cell.contest_id, facts));
            }
        }
        changed
    }

    pub fn contest_state(&self, contest_id: i32) -> Result<StateView, EngineError> {
        self.cell(contest_id)?.state_view(self.clock.now())
    }

    /// One standings page. `privileged` selects the live board during a
    /// freeze; `cutoff` pins a historical replay instead of the newest
    /// visible prefix.
    pub fn standings(
        &self,
        contest_id: i32,
        privileged: bool,
        page: u64,
        per_page: u64,
        cutoff: Option<u64>,
    ) -> Result<StandingsPage, EngineError> {
        self.cell(contest_id)?
            .standings_page(privileged, page, per_page, cutoff, self.clock.now())
    }
}
