use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::types::Muscle;

/// One exercise of the day's plan. Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePlanItem {
    pub id: String,
    pub name: String,
    pub muscle: Muscle,
    pub target_sets: u32,
    pub target_reps: u32,
    pub rest_seconds: u32,
    pub notes: Option<String>,
    #[serde(default)]
    pub media: Vec<String>,
}

impl ExercisePlanItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        muscle: Muscle,
        target_sets: u32,
        target_reps: u32,
        rest_seconds: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            muscle,
            target_sets,
            target_reps,
            rest_seconds,
            notes: None,
            media: Vec::new(),
        }
    }
}

/// Ordered exercise sequence; index defines traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPlan")]
pub struct ExercisePlan {
    pub name: String,
    pub description: Option<String>,
    items: Vec<ExercisePlanItem>,
}

/// Unchecked wire shape; deserialized plans go through `ExercisePlan::new`.
#[derive(Deserialize)]
struct RawPlan {
    name: String,
    #[serde(default)]
    description: Option<String>,
    items: Vec<ExercisePlanItem>,
}

impl TryFrom<RawPlan> for ExercisePlan {
    type Error = SessionError;

    fn try_from(raw: RawPlan) -> Result<Self> {
        let plan = ExercisePlan::new(raw.name, raw.items)?;
        Ok(match raw.description {
            Some(description) => plan.with_description(description),
            None => plan,
        })
    }
}

impl ExercisePlan {
    /// Builds a plan, rejecting empty plans, zero-set exercises and duplicate ids.
    pub fn new(name: impl Into<String>, items: Vec<ExercisePlanItem>) -> Result<Self> {
        if items.is_empty() {
            return Err(SessionError::InvalidPlan(
                "plan must contain at least one exercise".into(),
            ));
        }

        if let Some(item) = items.iter().find(|i| i.target_sets == 0) {
            return Err(SessionError::InvalidPlan(format!(
                "`{}` has zero target sets",
                item.name
            )));
        }

        let dupes = items.iter().map(|i| i.id.as_str()).duplicates().join(", ");
        if !dupes.is_empty() {
            return Err(SessionError::InvalidPlan(format!(
                "duplicate exercise ids: {dupes}"
            )));
        }

        Ok(Self {
            name: name.into(),
            description: None,
            items,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn items(&self) -> &[ExercisePlanItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&ExercisePlanItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Individual set record. Appended to the ledger, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSet {
    pub exercise_id: String,
    pub set_number: u32,
    pub reps: u32,
    pub weight: f32,
}

impl CompletedSet {
    pub fn volume(&self) -> f32 {
        self.reps as f32 * self.weight
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Active,
    Completed,
    Exited,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Phase::Active)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Active => "active",
            Phase::Completed => "completed",
            Phase::Exited => "exited",
        };
        write!(f, "{}", s)
    }
}

/// Read-only snapshot of the state machine for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_exercise_index: usize,
    pub current_set_number: u32,
    /// Every target set of the current exercise is in the ledger.
    pub exercise_complete: bool,
    pub rest_active: bool,
    pub rest_remaining_seconds: u32,
    pub elapsed_seconds: u64,
    pub phase: Phase,
}

/// Derived once when the session reaches `Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSummary {
    pub duration_seconds: u64,
    pub exercise_count: usize,
    pub total_volume: f32,
}

impl CompletionSummary {
    pub fn compute(sets: &[CompletedSet], elapsed_seconds: u64, plan_len: usize) -> Self {
        Self {
            duration_seconds: elapsed_seconds,
            exercise_count: plan_len,
            total_volume: sets.iter().map(CompletedSet::volume).sum(),
        }
    }
}

/// Per-exercise breakdown attached to a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseReport {
    pub exercise_id: String,
    pub name: String,
    pub sets_logged: u32,
    pub target_sets: u32,
    pub volume: f32,
    pub best_estimated_1rm: f32,
}

/// Record handed to the persistence collaborator once a session completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishedSession {
    pub id: String,
    pub plan: String,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub summary: CompletionSummary,
    pub exercises: Vec<ExerciseReport>,
    pub sets: Vec<CompletedSet>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OneRMFormula {
    #[default]
    Epley,
    Brzycki,
    Lombardi,
    OConner,
}

impl std::str::FromStr for OneRMFormula {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "epley" => Ok(OneRMFormula::Epley),
            "brzycki" => Ok(OneRMFormula::Brzycki),
            "lombardi" => Ok(OneRMFormula::Lombardi),
            "oconner" | "o'conner" => Ok(OneRMFormula::OConner),
            _ => Err(format!("unknown 1RM formula: {}", s)),
        }
    }
}
