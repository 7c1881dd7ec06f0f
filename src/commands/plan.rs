use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::{models::ExercisePlan, plan::load_plan, types::Settings};

pub fn handle(path: &Path, settings: &Settings, json: bool) -> Result<()> {
    let plan = load_plan(path, settings.default_rest_seconds)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        pretty_print(&plan);
    }
    Ok(())
}

fn pretty_print(plan: &ExercisePlan) {
    println!("{} {}", "Plan:".cyan().bold(), plan.name.bold());
    if let Some(desc) = &plan.description {
        println!("  {}", desc.dimmed());
    }

    let name_w = plan
        .items()
        .iter()
        .map(|i| i.name.chars().count())
        .max()
        .unwrap_or(0);

    println!("\n{}", "Exercises:".cyan().bold());
    for (i, item) in plan.items().iter().enumerate() {
        println!(
            "{} • {}  {} × {} reps, rest {}s {}",
            format!("{}", i + 1).yellow(),
            format!("{:<width$}", item.name, width = name_w).bold(),
            item.target_sets,
            item.target_reps,
            item.rest_seconds,
            format!("({})", item.muscle).dimmed(),
        );
        if let Some(notes) = &item.notes {
            println!("    {}", notes.dimmed());
        }
    }

    let total_sets: u32 = plan.items().iter().map(|i| i.target_sets).sum();
    println!("\n{} {} sets total", "ok:".green().bold(), total_sets);
}
