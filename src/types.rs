use once_cell::sync::Lazy;
use std::{
    collections::{BTreeMap, HashSet},
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use strsim::jaro_winkler;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::logging::{LogFormat, LogLevel};
use crate::models::OneRMFormula;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Muscle {
    Biceps,
    Triceps,
    Forearms,
    Chest,
    Shoulders,
    Back,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Abs,
}

impl Display for Muscle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Biceps => "biceps",
            Self::Triceps => "triceps",
            Self::Forearms => "forearms",
            Self::Chest => "chest",
            Self::Shoulders => "shoulders",
            Self::Back => "back",
            Self::Quads => "quads",
            Self::Hamstrings => "hamstrings",
            Self::Glutes => "glutes",
            Self::Calves => "calves",
            Self::Abs => "abs",
        };

        write!(f, "{}", s)
    }
}

impl FromStr for Muscle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let canon = cannonical_muscle(s).ok_or_else(|| format!("unknown muscle group `{s}`"))?;
        <Muscle as ValueEnum>::from_str(&canon, true)
    }
}

/// Lowercase names of every `Muscle` variant.
pub static ALLOWED_MUSCLES: Lazy<HashSet<String>> =
    Lazy::new(|| Muscle::value_variants().iter().map(|m| m.to_string()).collect());

/// Returns the canonical lowercase muscle name or `None` if not allowed.
pub fn cannonical_muscle<S: AsRef<str>>(m: S) -> Option<String> {
    let raw = m.as_ref().trim();
    if raw.chars().any(|c| c.is_control()) {
        return None;
    }

    let m = raw.to_ascii_lowercase();
    let m = match m.as_str() {
        "quad" | "quadriceps" => "quads".to_string(),
        _ => m,
    };
    if ALLOWED_MUSCLES.contains(m.as_str()) {
        Some(m)
    } else {
        None
    }
}

/// Return the closest allowed muscle for `input`
/// if similarity ≥ 0.80 *and* clearly better than the runner-up.
/// Otherwise return `None` (no suggestion shown).
pub fn best_muscle_suggestions(input: &str) -> Option<&'static str> {
    let inp = input.trim().to_ascii_lowercase();
    if inp.is_empty() {
        return None;
    }

    // Collect (muscle, score) pairs.
    let mut scores: Vec<(&'static str, f64)> = ALLOWED_MUSCLES
        .iter()
        .map(|m| (m.as_str(), jaro_winkler(&inp, m)))
        .collect();

    // Highest score first.
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (best_muscle, best_score) = scores[0];
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best_muscle)
    } else {
        None
    }
}

/// Flat key/value config persisted as TOML.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub map: BTreeMap<String, String>,
}

impl Config {
    /// Location used by the binary: `<config dir>/setwise/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("setwise").join("config.toml"))
            .context("Could not determine config directory")
    }

    /// A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to save config to {}", path.display()))
    }

    /// Typed view over the recognised keys. Unknown keys are ignored.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(v) = self.map.get(KEY_REST_DEFAULT) {
            settings.default_rest_seconds = v.parse().with_context(|| {
                format!("`{KEY_REST_DEFAULT}` must be a whole number of seconds")
            })?;
        }
        if let Some(v) = self.map.get(KEY_WEIGHT_UNIT) {
            settings.weight_unit = v.clone();
        }
        if let Some(v) = self.map.get(KEY_SESSIONS_DIR) {
            settings.sessions_dir = PathBuf::from(v);
        }
        if let Some(v) = self.map.get(KEY_ONE_RM_FORMULA) {
            settings.one_rm_formula = v.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = self.map.get(KEY_LOG_LEVEL) {
            settings.log_level = v.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = self.map.get(KEY_LOG_FORMAT) {
            settings.log_format = v.parse().map_err(anyhow::Error::msg)?;
        }

        Ok(settings)
    }
}

pub const KEY_REST_DEFAULT: &str = "rest.default";
pub const KEY_WEIGHT_UNIT: &str = "weight.unit";
pub const KEY_SESSIONS_DIR: &str = "sessions.dir";
pub const KEY_ONE_RM_FORMULA: &str = "one_rm.formula";
pub const KEY_LOG_LEVEL: &str = "log.level";
pub const KEY_LOG_FORMAT: &str = "log.format";

#[derive(Debug, Clone)]
pub struct Settings {
    pub default_rest_seconds: u32,
    pub weight_unit: String,
    pub sessions_dir: PathBuf,
    pub one_rm_formula: OneRMFormula,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_rest_seconds: 90,
            weight_unit: "kg".to_string(),
            sessions_dir: dirs::data_dir()
                .map(|d| d.join("setwise").join("sessions"))
                .unwrap_or_else(|| PathBuf::from("sessions")),
            one_rm_formula: OneRMFormula::Epley,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cannonical_muscle() {
        assert_eq!(cannonical_muscle("Chest"), Some("chest".to_string()));
        assert_eq!(cannonical_muscle("quadriceps"), Some("quads".to_string()));
        assert_eq!(cannonical_muscle("neck"), None);
        assert_eq!(cannonical_muscle("che\u{7}st"), None);
    }

    #[test]
    fn test_muscle_from_str() {
        assert_eq!("Hamstrings".parse::<Muscle>(), Ok(Muscle::Hamstrings));
        assert!("wings".parse::<Muscle>().is_err());
    }

    #[test]
    fn test_suggestions() {
        assert_eq!(best_muscle_suggestions("tricep"), Some("triceps"));
        assert_eq!(best_muscle_suggestions("hamstrng"), Some("hamstrings"));
        assert_eq!(best_muscle_suggestions("zzz"), None);
        assert_eq!(best_muscle_suggestions("   "), None);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::load(&path).unwrap();
        assert!(cfg.map.is_empty());

        cfg.map.insert(KEY_REST_DEFAULT.into(), "120".into());
        cfg.map.insert("unknown.key".into(), "kept".into());
        cfg.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.map.get("unknown.key").map(String::as_str), Some("kept"));
        let settings = loaded.settings().unwrap();
        assert_eq!(settings.default_rest_seconds, 120);
        assert_eq!(settings.weight_unit, "kg");
    }

    #[test]
    fn test_settings_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.map.insert(KEY_REST_DEFAULT.into(), "soon".into());
        assert!(cfg.settings().is_err());

        let mut cfg = Config::default();
        cfg.map.insert(KEY_ONE_RM_FORMULA.into(), "brzycki".into());
        assert_eq!(cfg.settings().unwrap().one_rm_formula, OneRMFormula::Brzycki);
    }
}
