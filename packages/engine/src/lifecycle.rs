use chrono::{DateTime, Duration, Utc};
use common::ContestState;

use crate::config::ContestConfig;
use crate::error::EngineError;

/// Recorded lifecycle facts of one contest. The state itself is derived
/// from these plus the clock and never stored, so a restarted process
/// re-derives exactly the state it crashed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifecycleFacts {
    /// Actual start instant; the scheduled boundary for clock starts, the
    /// command instant for an early start.
    pub started_at: Option<DateTime<Utc>>,
    /// Set while the clock is suspended.
    pub paused_at: Option<DateTime<Utc>>,
    /// Completed pause time folded in on each resume.
    pub total_paused: Duration,
    /// Instant the standings froze, if they did.
    pub frozen_at: Option<DateTime<Utc>>,
    /// Ledger head pinned when the freeze began; the public board never
    /// moves past it while the gate holds.
    pub freeze_cutoff: Option<u64>,
    pub ended_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Default for LifecycleFacts {
    fn default() -> Self {
        Self {
            started_at: None,
            paused_at: None,
            total_paused: Duration::zero(),
            frozen_at: None,
            freeze_cutoff: None,
            ended_at: None,
            cancelled_at: None,
        }
    }
}

impl LifecycleFacts {
    pub fn state(&self) -> ContestState {
        if self.cancelled_at.is_some() {
            ContestState::Cancelled
        } else if self.ended_at.is_some() {
            ContestState::Ended
        } else if self.paused_at.is_some() {
            ContestState::Paused
        } else if self.started_at.is_none() {
            ContestState::Scheduled
        } else if self.frozen_at.is_some() {
            ContestState::FrozenLive
        } else {
            ContestState::Live
        }
    }

    /// Pinned cutoff while the freeze gate holds. The gate survives a pause
    /// and only clears once the contest is terminal (post-contest reveal).
    pub fn freeze_gate(&self) -> Option<u64> {
        if self.state().is_terminal() {
            None
        } else {
            self.freeze_cutoff
        }
    }
}

/// Effective end: scheduled length stretched by completed pauses.
pub fn effective_end(config: &ContestConfig, facts: &LifecycleFacts) -> Option<DateTime<Utc>> {
    facts
        .started_at
        .map(|start| start + config.duration + facts.total_paused)
}

/// Instant the automatic freeze is due, shifted like the effective end.
pub fn freeze_point(config: &ContestConfig, facts: &LifecycleFacts) -> Option<DateTime<Utc>> {
    if !config.freeze_enabled() {
        return None;
    }
    facts
        .started_at
        .map(|start| start + config.duration - config.freeze_offset + facts.total_paused)
}

/// Submissions are admitted strictly before this instant.
pub fn submission_deadline(config: &ContestConfig, facts: &LifecycleFacts) -> Option<DateTime<Utc>> {
    facts
        .started_at
        .map(|start| start + config.duration + config.grace + facts.total_paused)
}

/// Competitors may join while `now <= started_at + grace`; the window is
/// measured from the actual start and is not stretched by pauses.
pub fn join_deadline(config: &ContestConfig, facts: &LifecycleFacts) -> Option<DateTime<Utc>> {
    facts.started_at.map(|start| start + config.grace)
}

/// Applies every clock-driven transition due at `now`: auto start, auto
/// freeze, auto end. Returns true if any fact changed.
///
/// Mutating paths run this under the contest sequencer before acting, so a
/// submission or command can never observe a stale state. Read paths run it
/// on a copy to project the current state without publishing anything; the
/// projection is deterministic in `(facts, last_seq, now)`, so a later
/// mutating advance lands on the same facts.
pub fn advance(
    config: &ContestConfig,
    facts: &mut LifecycleFacts,
    last_seq: u64,
    now: DateTime<Utc>,
) -> bool {
    // A suspended or terminal clock does not move on its own.
    if facts.cancelled_at.is_some() || facts.ended_at.is_some() || facts.paused_at.is_some() {
        return false;
    }
    let before = *facts;
    if facts.started_at.is_none() {
        if now < config.start_time {
            return false;
        }
        // Late ticks still start the contest at its scheduled boundary.
        facts.started_at = Some(config.start_time);
    }
    if facts.frozen_at.is_none()
        && let Some(due) = freeze_point(config, facts)
        && now >= due
    {
        facts.frozen_at = Some(due);
        facts.freeze_cutoff = Some(last_seq);
    }
    if config.auto_end
        && let Some(end) = effective_end(config, facts)
        && now >= end
    {
        facts.ended_at = Some(end);
    }
    *facts != before
}

/// Clock-affecting subset of the admin vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockCommand {
    Start,
    Pause,
    Resume,
    FreezeNow,
    End,
    Cancel,
}

impl ClockCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Pause => "Pause",
            Self::Resume => "Resume",
            Self::FreezeNow => "FreezeNow",
            Self::End => "End",
            Self::Cancel => "Cancel",
        }
    }
}

fn close_pause(facts: &mut LifecycleFacts, now: DateTime<Utc>) {
    if let Some(paused_at) = facts.paused_at.take() {
        facts.total_paused += now - paused_at;
    }
}

/// Applies one admin lifecycle command on top of already-advanced facts.
///
/// Commands that race a clock twin (Start, FreezeNow, End) and the
/// unconditionally-accepted Cancel are no-ops when the contest is already in
/// their target state; that is the second arrival of a transition the clock
/// just performed. Everything else not listed for the current state fails
/// `InvalidTransition` with no partial effects.
pub fn apply(
    config: &ContestConfig,
    facts: &mut LifecycleFacts,
    last_seq: u64,
    now: DateTime<Utc>,
    command: ClockCommand,
) -> Result<ContestState, EngineError> {
    use ContestState::*;

    let state = facts.state();
    match (command, state) {
        (ClockCommand::Start, Scheduled) => facts.started_at = Some(now),
        (ClockCommand::Start, Live) => {}

        (ClockCommand::Pause, Live | FrozenLive) => facts.paused_at = Some(now),

        (ClockCommand::Resume, Paused) => {
            close_pause(facts, now);
            // Re-evaluate which running state applies with the stretched
            // boundaries; this may also auto-end an overdue contest.
            advance(config, facts, last_seq, now);
        }

        (ClockCommand::FreezeNow, Live) => {
            facts.frozen_at = Some(now);
            facts.freeze_cutoff = Some(last_seq);
        }
        (ClockCommand::FreezeNow, FrozenLive) => {}

        (ClockCommand::End, Live | FrozenLive) => facts.ended_at = Some(now),
        (ClockCommand::End, Paused) => {
            close_pause(facts, now);
            facts.ended_at = Some(now);
        }
        (ClockCommand::End, Ended) => {}

        (ClockCommand::Cancel, Scheduled | Live | FrozenLive) => facts.cancelled_at = Some(now),
        (ClockCommand::Cancel, Paused) => {
            close_pause(facts, now);
            facts.cancelled_at = Some(now);
        }
        (ClockCommand::Cancel, Cancelled) => {}

        _ => {
            return Err(EngineError::InvalidTransition {
                state,
                command: command.name(),
            });
        }
    }
    Ok(facts.state())
}
