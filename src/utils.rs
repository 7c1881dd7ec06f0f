use anyhow::{Result, anyhow};

use crate::models::OneRMFormula;

pub fn calculate_1rm(weight: f32, reps: u32, formula: OneRMFormula) -> f32 {
    if reps == 0 {
        return 0.0;
    }

    match formula {
        OneRMFormula::Epley => weight * (1.0 + reps as f32 / 30.0),
        OneRMFormula::Brzycki => weight / (1.0278 - 0.0278 * reps as f32),
        OneRMFormula::Lombardi => weight * (reps as f32).powf(0.10),
        OneRMFormula::OConner => weight * (1.0 + 0.025 * reps as f32),
    }
}

pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds / 60) % 60;
    let seconds = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Parses a weight argument; `bw` (bodyweight) counts as zero external load.
pub fn parse_weight(raw: &str) -> Result<f32> {
    if raw.eq_ignore_ascii_case("bw") {
        return Ok(0.0);
    }

    let w: f32 = raw
        .parse()
        .map_err(|_| anyhow!("invalid weight: {}", raw))?;
    if !w.is_finite() || w < 0.0 {
        return Err(anyhow!("invalid weight: {}", raw));
    }
    Ok(w)
}
