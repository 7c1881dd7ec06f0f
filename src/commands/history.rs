use anyhow::Result;
use colored::Colorize;

use crate::{
    models::FinishedSession,
    storage::JsonSessionStore,
    types::Settings,
    utils::format_duration,
};

pub fn handle(id: Option<String>, last: bool, settings: &Settings, json: bool) -> Result<()> {
    let store = JsonSessionStore::new(&settings.sessions_dir);

    let single = match (id, last) {
        (Some(id), _) => Some(store.load(&id)?),
        (None, true) => Some(store.latest()?),
        (None, false) => None,
    };

    if let Some(session) = single {
        if json {
            println!("{}", serde_json::to_string_pretty(&session)?);
        } else {
            show_session(&session, &settings.weight_unit);
        }
        return Ok(());
    }

    let sessions = store.list()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("{}", "  (no finished sessions)".dimmed());
        return Ok(());
    }

    println!("{}", "Sessions:".cyan().bold());
    for s in &sessions {
        println!(
            "  {} {} — {} ({}, {}{})",
            s.finished_at.format("%Y-%m-%d %H:%M").to_string().yellow(),
            s.plan.bold(),
            s.id.dimmed(),
            format_duration(s.summary.duration_seconds),
            s.summary.total_volume,
            settings.weight_unit
        );
    }
    Ok(())
}

fn show_session(session: &FinishedSession, unit: &str) {
    println!("{} {}", "Session:".cyan().bold(), session.plan.bold());
    println!("  Started:  {}", session.started_at.format("%Y-%m-%d %H:%M"));
    println!("  Finished: {}", session.finished_at.format("%Y-%m-%d %H:%M"));
    println!(
        "  Duration: {} — {} exercises, volume {}{}",
        format_duration(session.summary.duration_seconds),
        session.summary.exercise_count,
        session.summary.total_volume,
        unit
    );

    for (idx, ex) in session.exercises.iter().enumerate() {
        println!(
            "\n{}. {} ({}/{} sets)",
            idx + 1,
            ex.name.bold(),
            ex.sets_logged,
            ex.target_sets
        );

        for set in session.sets.iter().filter(|s| s.exercise_id == ex.exercise_id) {
            if set.weight > 0.0 {
                println!("  Set {}: {}{} x {}", set.set_number, set.weight, unit, set.reps);
            } else {
                println!("  Set {}: Bodyweight x {}", set.set_number, set.reps);
            }
        }

        if ex.best_estimated_1rm > 0.0 {
            println!("  Best e1RM: {:.1}{}", ex.best_estimated_1rm, unit);
        }
    }
}
