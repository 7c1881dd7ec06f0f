//! Real-time driver for a [`WorkoutSession`].
//!
//! Two independent tokio tasks feed one-second ticks into the session: the
//! session clock runs from start to the terminal transition, the rest task
//! only while a rest countdown is active. Terminal transitions abort both, and
//! the state machine ignores any tick that still slips through.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::error::Result;
use crate::models::{ExercisePlan, SessionState};
use crate::session::{Transition, WorkoutSession};

const TICK: Duration = Duration::from_secs(1);

/// Notifications raised by the tick sources, not by operator commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RestFinished,
}

pub struct LiveSession {
    inner: Arc<Mutex<WorkoutSession>>,
    clock_task: Option<JoinHandle<()>>,
    rest_task: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl LiveSession {
    /// Starts the session and its clock. Must be called inside a tokio runtime.
    pub fn start(plan: ExercisePlan) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Mutex::new(WorkoutSession::start(plan)));

        let mut live = Self {
            inner,
            clock_task: None,
            rest_task: None,
            events: tx,
        };
        live.spawn_clock();
        (live, rx)
    }

    pub async fn log_set(&mut self, reps: u32, weight: f32) -> Result<Transition> {
        let t = self.inner.lock().await.log_set(reps, weight)?;
        self.apply(&t);
        Ok(t)
    }

    pub async fn next_exercise(&mut self) -> Result<Transition> {
        let t = self.inner.lock().await.next_exercise()?;
        self.apply(&t);
        Ok(t)
    }

    pub async fn previous_exercise(&mut self) -> Result<Transition> {
        let t = self.inner.lock().await.previous_exercise()?;
        self.apply(&t);
        Ok(t)
    }

    pub async fn skip_rest(&mut self) -> Result<Transition> {
        let t = self.inner.lock().await.skip_rest()?;
        self.apply(&t);
        Ok(t)
    }

    pub async fn complete_session(&mut self) -> Result<Transition> {
        let t = self.inner.lock().await.complete_session()?;
        self.apply(&t);
        Ok(t)
    }

    pub async fn exit_session(&mut self) -> Result<Transition> {
        let t = self.inner.lock().await.exit_session()?;
        self.apply(&t);
        Ok(t)
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state()
    }

    /// Runs `f` against the session under the lock.
    pub async fn with<R>(&self, f: impl FnOnce(&WorkoutSession) -> R) -> R {
        f(&*self.inner.lock().await)
    }

    pub fn clock_running(&self) -> bool {
        self.clock_task.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn rest_running(&self) -> bool {
        self.rest_task.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn apply(&mut self, t: &Transition) {
        match t {
            Transition::RestStarted { .. } => self.spawn_rest(),
            Transition::RestSkipped => self.abort_rest(),
            Transition::Completed(_) | Transition::Exited => {
                self.abort_rest();
                self.abort_clock();
            }
            Transition::SetLogged | Transition::ExerciseDone | Transition::Moved { .. } => {}
        }
    }

    fn spawn_clock(&mut self) {
        let inner = Arc::clone(&self.inner);

        self.clock_task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                let mut session = inner.lock().await;
                if session.phase().is_terminal() {
                    break;
                }
                session.tick_clock();
            }
        }));
    }

    fn spawn_rest(&mut self) {
        self.abort_rest();
        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();

        self.rest_task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                let (finished, still_resting) = {
                    let mut session = inner.lock().await;
                    let finished = session.tick_rest();
                    (finished, session.state().rest_active)
                };

                if finished {
                    // receiver may be gone if nobody listens
                    let _ = events.send(SessionEvent::RestFinished);
                }
                if !still_resting {
                    break;
                }
            }
        }));
    }

    fn abort_rest(&mut self) {
        if let Some(handle) = self.rest_task.take() {
            debug!("rest ticker cancelled");
            handle.abort();
        }
    }

    fn abort_clock(&mut self) {
        if let Some(handle) = self.clock_task.take() {
            debug!("session clock cancelled");
            handle.abort();
        }
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.abort_rest();
        self.abort_clock();
    }
}
