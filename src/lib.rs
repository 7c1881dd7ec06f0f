//! Live workout-session runtime.
//!
//! A [`session::WorkoutSession`] walks an operator through an
//! [`models::ExercisePlan`], recording sets in a [`ledger::SetLedger`] and
//! running rest countdowns between them. [`runtime::LiveSession`] drives it
//! in real time on tokio.

pub mod cli;
pub mod commands;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod plan;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod timer;
pub mod types;
pub mod utils;

pub use error::{Result, SessionError};
pub use ledger::SetLedger;
pub use models::{
    CompletedSet, CompletionSummary, ExercisePlan, ExercisePlanItem, FinishedSession, Phase,
    SessionState,
};
pub use runtime::{LiveSession, SessionEvent};
pub use session::{Transition, WorkoutSession};
pub use storage::{JsonSessionStore, SessionSink};
