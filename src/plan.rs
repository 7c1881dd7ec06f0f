use std::{fs::read_to_string, path::Path};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    models::{ExercisePlan, ExercisePlanItem},
    types::{Muscle, best_muscle_suggestions, cannonical_muscle},
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanToml {
    name: String,
    description: Option<String>,
    #[serde(rename = "exercise", default)]
    exercises: Vec<PlanExerciseToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanExerciseToml {
    id: Option<String>,
    name: String,
    muscle: String,
    sets: u32,
    reps: u32,
    rest: Option<u32>,
    notes: Option<String>,
    #[serde(default)]
    media: Vec<String>,
}

pub fn load_plan(path: &Path, default_rest: u32) -> Result<ExercisePlan> {
    let content = read_to_string(path)
        .with_context(|| format!("Plan file '{}' not found", path.display()))?;

    parse_plan(&content, default_rest)
        .with_context(|| format!("Invalid plan file: {}", path.display()))
}

/// Parses a TOML plan. Exercises without `rest` use `default_rest`; exercises
/// without `id` get a fresh one.
pub fn parse_plan(content: &str, default_rest: u32) -> Result<ExercisePlan> {
    let raw: PlanToml = toml::from_str(content)?;

    let mut items = Vec::with_capacity(raw.exercises.len());
    for ex in raw.exercises {
        let muscle = resolve_muscle(&ex.muscle)
            .with_context(|| format!("exercise `{}`", ex.name))?;

        items.push(ExercisePlanItem {
            id: ex.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: ex.name,
            muscle,
            target_sets: ex.sets,
            target_reps: ex.reps,
            rest_seconds: ex.rest.unwrap_or(default_rest),
            notes: ex.notes,
            media: ex.media,
        });
    }

    let plan = ExercisePlan::new(raw.name, items)?;
    Ok(match raw.description {
        Some(d) => plan.with_description(d),
        None => plan,
    })
}

fn resolve_muscle(raw: &str) -> Result<Muscle> {
    if let Some(canon) = cannonical_muscle(raw) {
        return canon.parse().map_err(anyhow::Error::msg);
    }

    match best_muscle_suggestions(raw) {
        Some(s) => bail!("unknown muscle group `{}` (did you mean `{}`?)", raw, s),
        None => bail!("unknown muscle group `{}`", raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUSH_DAY: &str = r#"
        name = "Push day"
        description = "Chest and triceps"

        [[exercise]]
        id = "bench"
        name = "Bench press"
        muscle = "Chest"
        sets = 3
        reps = 8
        rest = 120
        notes = "pause on the chest"

        [[exercise]]
        name = "Pushdown"
        muscle = "triceps"
        sets = 2
        reps = 12
        media = ["https://example.com/pushdown.mp4"]
    "#;

    #[test]
    fn test_parse_plan() {
        let plan = parse_plan(PUSH_DAY, 75).unwrap();
        assert_eq!(plan.name, "Push day");
        assert_eq!(plan.description.as_deref(), Some("Chest and triceps"));
        assert_eq!(plan.len(), 2);

        let bench = &plan.items()[0];
        assert_eq!(bench.id, "bench");
        assert_eq!(bench.muscle, Muscle::Chest);
        assert_eq!(bench.rest_seconds, 120);

        let pushdown = &plan.items()[1];
        assert_eq!(pushdown.rest_seconds, 75);
        assert!(!pushdown.id.is_empty());
        assert_eq!(pushdown.media.len(), 1);
    }

    #[test]
    fn test_unknown_muscle_suggests() {
        let content = r#"
            name = "x"
            [[exercise]]
            name = "Curl"
            muscle = "bicep"
            sets = 3
            reps = 10
        "#;
        let err = format!("{:#}", parse_plan(content, 60).unwrap_err());
        assert!(err.contains("did you mean `biceps`"), "{err}");
    }

    #[test]
    fn test_rejects_empty_plan() {
        let err = parse_plan("name = \"nothing\"", 60).unwrap_err();
        assert!(err.to_string().contains("at least one exercise"));
    }

    #[test]
    fn test_load_plan_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_plan(&dir.path().join("nope.toml"), 60).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
