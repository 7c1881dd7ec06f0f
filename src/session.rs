//! The workout session state machine.
//!
//! ```text
//!            log_set / next / prev / skip_rest / tick
//!                 ┌──────────┐
//!                 ▼          │
//!   start ──▶  Active ───────┘
//!               │   │
//!   complete /  │   │  exit_session
//!   last set    ▼   ▼
//!        Completed  Exited
//! ```
//!
//! Everything here is synchronous and tick-driven; `runtime::LiveSession`
//! supplies the real-time ticks.

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, SessionError};
use crate::ledger::SetLedger;
use crate::models::{
    CompletionSummary, ExercisePlan, ExercisePlanItem, ExerciseReport, FinishedSession,
    OneRMFormula, Phase, SessionState,
};
use crate::timer::{RestTimer, SessionClock};
use crate::utils;

/// What an accepted command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Set logged, more sets remain and a rest countdown is running.
    RestStarted { seconds: u32 },
    /// Set logged, more sets remain, exercise has no rest configured.
    SetLogged,
    /// Last set of a non-final exercise logged.
    ExerciseDone,
    /// Session reached `Completed`.
    Completed(CompletionSummary),
    /// Navigation landed on another exercise.
    Moved { index: usize, set_number: u32 },
    RestSkipped,
    Exited,
}

/// Result of one clock second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    pub rest_finished: bool,
}

#[derive(Debug, Clone)]
pub struct WorkoutSession {
    id: String,
    plan: ExercisePlan,
    ledger: SetLedger,
    rest: RestTimer,
    clock: SessionClock,
    index: usize,
    set_number: u32,
    phase: Phase,
    summary: Option<CompletionSummary>,
    started_at: DateTime<Local>,
    finished_at: Option<DateTime<Local>>,
}

impl WorkoutSession {
    /// Starts a session positioned on the first exercise with the clock running.
    pub fn start(plan: ExercisePlan) -> Self {
        let mut clock = SessionClock::new();
        clock.start();

        let session = Self {
            id: Uuid::new_v4().to_string(),
            plan,
            ledger: SetLedger::new(),
            rest: RestTimer::new(),
            clock,
            index: 0,
            set_number: 1,
            phase: Phase::Active,
            summary: None,
            started_at: Local::now(),
            finished_at: None,
        };
        info!(
            session = %session.id,
            plan = %session.plan.name,
            exercises = session.plan.len(),
            "session started"
        );
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn plan(&self) -> &ExercisePlan {
        &self.plan
    }

    pub fn ledger(&self) -> &SetLedger {
        &self.ledger
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_exercise(&self) -> &ExercisePlanItem {
        // index stays within [0, len) and plans are never empty
        &self.plan.items()[self.index]
    }

    /// Present only once the session has `Completed`.
    pub fn summary(&self) -> Option<&CompletionSummary> {
        self.summary.as_ref()
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            current_exercise_index: self.index,
            current_set_number: self.set_number,
            exercise_complete: self.is_exercise_complete(self.index),
            rest_active: self.rest.is_active(),
            rest_remaining_seconds: self.rest.remaining(),
            elapsed_seconds: self.clock.elapsed(),
            phase: self.phase,
        }
    }

    pub fn is_exercise_complete(&self, index: usize) -> bool {
        self.plan
            .get(index)
            .is_some_and(|item| self.ledger.sets_logged(&item.id) >= item.target_sets)
    }

    /// Target sets of an exercise that have no ledger entry yet.
    pub fn remaining_sets(&self, index: usize) -> u32 {
        self.plan.get(index).map_or(0, |item| {
            item.target_sets
                .saturating_sub(self.ledger.sets_logged(&item.id))
        })
    }

    pub fn log_set(&mut self, reps: u32, weight: f32) -> Result<Transition> {
        let res = self.try_log_set(reps, weight);
        self.trace("log set", res)
    }

    pub fn next_exercise(&mut self) -> Result<Transition> {
        let res = self.try_move(1);
        self.trace("next exercise", res)
    }

    pub fn previous_exercise(&mut self) -> Result<Transition> {
        let res = self.try_move(-1);
        self.trace("previous exercise", res)
    }

    pub fn skip_rest(&mut self) -> Result<Transition> {
        let res = self.try_skip_rest();
        self.trace("skip rest", res)
    }

    pub fn complete_session(&mut self) -> Result<Transition> {
        let res = self
            .ensure_active("complete session")
            .map(|_| self.finish(Phase::Completed));
        self.trace("complete session", res)
    }

    pub fn exit_session(&mut self) -> Result<Transition> {
        let res = self
            .ensure_active("exit session")
            .map(|_| self.finish(Phase::Exited));
        self.trace("exit session", res)
    }

    /// One second of the session clock. Inert once terminal.
    pub fn tick_clock(&mut self) {
        if self.phase == Phase::Active {
            self.clock.tick();
        }
    }

    /// One second of the rest countdown. Returns `true` when rest just ran out.
    pub fn tick_rest(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }

        let finished = self.rest.tick();
        if finished {
            info!(session = %self.id, "rest finished");
        }
        finished
    }

    /// Advances both tick sources by one second.
    pub fn tick(&mut self) -> Tick {
        self.tick_clock();
        Tick {
            rest_finished: self.tick_rest(),
        }
    }

    /// Record for the persistence collaborator; `None` unless `Completed`.
    pub fn finished_session(&self, formula: OneRMFormula) -> Option<FinishedSession> {
        let summary = self.summary.clone()?;

        let exercises = self
            .plan
            .items()
            .iter()
            .map(|item| ExerciseReport {
                exercise_id: item.id.clone(),
                name: item.name.clone(),
                sets_logged: self.ledger.sets_logged(&item.id),
                target_sets: item.target_sets,
                volume: self.ledger.volume_for(&item.id),
                best_estimated_1rm: self
                    .ledger
                    .sets_for(&item.id)
                    .map(|s| utils::calculate_1rm(s.weight, s.reps, formula))
                    .filter(|e| e.is_finite())
                    .fold(0.0, f32::max),
            })
            .collect();

        Some(FinishedSession {
            id: self.id.clone(),
            plan: self.plan.name.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at.unwrap_or_else(Local::now),
            summary,
            exercises,
            sets: self.ledger.entries().to_vec(),
        })
    }

    //
    // Transitions
    //

    fn try_log_set(&mut self, reps: u32, weight: f32) -> Result<Transition> {
        self.ensure_active("log set")?;

        if self.rest.is_active() {
            return Err(SessionError::invalid_op(
                "log set",
                format!("resting ({}s left)", self.rest.remaining()),
            ));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(SessionError::invalid_op(
                "log set",
                format!("weight must be a non-negative number, got {weight}"),
            ));
        }
        // saved sessions cannot represent an infinite volume
        let volume = reps as f32 * weight;
        if !volume.is_finite() || !(self.ledger.total_volume() + volume).is_finite() {
            return Err(SessionError::invalid_op(
                "log set",
                format!("{reps} × {weight} is beyond the recordable volume"),
            ));
        }

        let item = self.current_exercise();
        let (id, target, rest_seconds) = (item.id.clone(), item.target_sets, item.rest_seconds);

        if self.ledger.sets_logged(&id) >= target {
            return Err(SessionError::invalid_op(
                "log set",
                format!("all {target} sets of `{}` are already logged", item.name),
            ));
        }

        self.ledger.record(&id, self.set_number, reps, weight)?;

        if self.set_number < target {
            self.set_number += 1;
            self.rest.start(rest_seconds);
            if self.rest.is_active() {
                info!(session = %self.id, seconds = rest_seconds, "rest started");
                return Ok(Transition::RestStarted {
                    seconds: rest_seconds,
                });
            }
            return Ok(Transition::SetLogged);
        }

        if self.index + 1 == self.plan.len() {
            return Ok(self.finish(Phase::Completed));
        }
        Ok(Transition::ExerciseDone)
    }

    fn try_move(&mut self, step: isize) -> Result<Transition> {
        let command = if step > 0 {
            "next exercise"
        } else {
            "previous exercise"
        };
        self.ensure_active(command)?;

        let target = self.index as isize + step;
        if target < 0 || target >= self.plan.len() as isize {
            return Err(SessionError::OutOfRange {
                index: target,
                len: self.plan.len(),
            });
        }

        self.index = target as usize;
        self.set_number = self.resume_set_number(self.index);
        Ok(Transition::Moved {
            index: self.index,
            set_number: self.set_number,
        })
    }

    fn try_skip_rest(&mut self) -> Result<Transition> {
        self.ensure_active("skip rest")?;
        if !self.rest.is_active() {
            return Err(SessionError::invalid_op("skip rest", "no rest in progress"));
        }

        self.rest.cancel();
        Ok(Transition::RestSkipped)
    }

    /// First unlogged set of an exercise, or its last set when fully logged.
    fn resume_set_number(&self, index: usize) -> u32 {
        let item = &self.plan.items()[index];
        (self.ledger.sets_logged(&item.id) + 1).min(item.target_sets)
    }

    fn finish(&mut self, phase: Phase) -> Transition {
        debug_assert!(phase.is_terminal());

        self.rest.cancel();
        self.clock.stop();
        self.phase = phase;
        self.finished_at = Some(Local::now());

        match phase {
            Phase::Completed => {
                let summary = CompletionSummary::compute(
                    self.ledger.entries(),
                    self.clock.elapsed(),
                    self.plan.len(),
                );
                info!(
                    session = %self.id,
                    duration = summary.duration_seconds,
                    volume = summary.total_volume,
                    "session completed"
                );
                self.summary = Some(summary.clone());
                Transition::Completed(summary)
            }
            _ => {
                info!(session = %self.id, sets = self.ledger.len(), "session exited");
                Transition::Exited
            }
        }
    }

    fn ensure_active(&self, command: &'static str) -> Result<()> {
        if self.phase.is_terminal() {
            return Err(SessionError::invalid_op(
                command,
                format!("session already {}", self.phase),
            ));
        }
        Ok(())
    }

    fn trace(&self, command: &'static str, res: Result<Transition>) -> Result<Transition> {
        match &res {
            Ok(t) => debug!(session = %self.id, command, transition = ?t, "command accepted"),
            Err(e) => warn!(session = %self.id, command, error = %e, "command rejected"),
        }
        res
    }
}
