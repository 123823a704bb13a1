use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::percentiles::{PercentileKind, PercentileOptions};

const DATA_DIR: &str = "matchday_stats";
const DB_FILE: &str = "mart.sqlite";

pub const DEFAULT_FORM_WINDOW: usize = 5;
pub const DEFAULT_RADAR_PADDING_PCT: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub db_path: PathBuf,
    pub form_window: usize,
    pub radar_padding_pct: f64,
    pub percentiles: PercentileOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(&opt_env),
            form_window: DEFAULT_FORM_WINDOW,
            radar_padding_pct: DEFAULT_RADAR_PADDING_PCT,
            percentiles: PercentileOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Reads `.env.local` / `.env` if present, then the process environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let opt = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());

        let db_path = opt("MART_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_db_path(&opt));
        let form_window = opt("FORM_WINDOW")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_FORM_WINDOW)
            .clamp(1, 20);
        let radar_padding_pct = opt("RADAR_PADDING_PCT")
            .and_then(|val| val.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_RADAR_PADDING_PCT)
            .clamp(0.0, 1.0);

        let kind = match opt("PERCENTILE_KIND") {
            Some(raw) => raw.parse::<PercentileKind>().unwrap_or_else(|err| {
                warn!(error = %err, "falling back to weak percentiles");
                PercentileKind::Weak
            }),
            None => PercentileKind::default(),
        };
        let mut percentiles = PercentileOptions {
            kind,
            ..PercentileOptions::default()
        };
        if let Some(extra) = opt("PERCENTILE_EXCLUDE") {
            for column in extra.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                if !percentiles.exclude.iter().any(|c| c == column) {
                    percentiles.exclude.push(column.to_string());
                }
            }
        }

        Self {
            db_path,
            form_window,
            radar_padding_pct,
            percentiles,
        }
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.trim().is_empty())
}

fn default_db_path(opt: &dyn Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(base) = opt("XDG_CACHE_HOME") {
        return PathBuf::from(base).join(DATA_DIR).join(DB_FILE);
    }
    match opt("HOME") {
        Some(home) => PathBuf::from(home).join(".cache").join(DATA_DIR).join(DB_FILE),
        None => PathBuf::from(DB_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::percentiles::DEFAULT_EXCLUDED;

    #[test]
    fn defaults_without_environment() {
        let config = EngineConfig::default();
        assert_eq!(config.form_window, 5);
        assert_eq!(config.radar_padding_pct, 0.15);
        assert_eq!(config.percentiles.kind, PercentileKind::Weak);
        assert!(config.db_path.ends_with("mart.sqlite"));
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn form_window_is_clamped() {
        let config = EngineConfig::from_lookup(lookup(&[("FORM_WINDOW", "50")]));
        assert_eq!(config.form_window, 20);
        let config = EngineConfig::from_lookup(lookup(&[("FORM_WINDOW", "0")]));
        assert_eq!(config.form_window, 1);
        let config = EngineConfig::from_lookup(lookup(&[("FORM_WINDOW", " 8 ")]));
        assert_eq!(config.form_window, 8);
        let config = EngineConfig::from_lookup(lookup(&[("FORM_WINDOW", "many")]));
        assert_eq!(config.form_window, DEFAULT_FORM_WINDOW);
    }

    #[test]
    fn radar_padding_is_clamped() {
        let config = EngineConfig::from_lookup(lookup(&[("RADAR_PADDING_PCT", "1.7")]));
        assert_eq!(config.radar_padding_pct, 1.0);
        let config = EngineConfig::from_lookup(lookup(&[("RADAR_PADDING_PCT", "-0.2")]));
        assert_eq!(config.radar_padding_pct, 0.0);
        let config = EngineConfig::from_lookup(lookup(&[("RADAR_PADDING_PCT", "NaN")]));
        assert_eq!(config.radar_padding_pct, DEFAULT_RADAR_PADDING_PCT);
    }

    #[test]
    fn unknown_percentile_kind_falls_back_to_weak() {
        let config = EngineConfig::from_lookup(lookup(&[("PERCENTILE_KIND", "median")]));
        assert_eq!(config.percentiles.kind, PercentileKind::Weak);
        let config = EngineConfig::from_lookup(lookup(&[("PERCENTILE_KIND", "Rank")]));
        assert_eq!(config.percentiles.kind, PercentileKind::Rank);
    }

    #[test]
    fn extra_exclusions_are_deduplicated() {
        let config = EngineConfig::from_lookup(lookup(&[(
            "PERCENTILE_EXCLUDE",
            "matches_played, team_id,,matches_played",
        )]));
        let exclude = &config.percentiles.exclude;
        assert_eq!(exclude.iter().filter(|c| *c == "matches_played").count(), 1);
        assert_eq!(exclude.iter().filter(|c| *c == "team_id").count(), 1);
        assert_eq!(exclude.len(), DEFAULT_EXCLUDED.len() + 1);
    }

    #[test]
    fn db_path_prefers_explicit_then_xdg() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("MART_DB_PATH", "/data/snap.sqlite"),
            ("XDG_CACHE_HOME", "/xdg"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/data/snap.sqlite"));
        let env = lookup(&[("XDG_CACHE_HOME", "/xdg"), ("HOME", "/h")]);
        let config = EngineConfig::from_lookup(env);
        assert_eq!(config.db_path, PathBuf::from("/xdg/matchday_stats/mart.sqlite"));
        let env = lookup(&[("MART_DB_PATH", "  "), ("HOME", "/h")]);
        let config = EngineConfig::from_lookup(env);
        assert_eq!(config.db_path, PathBuf::from("/h/.cache/matchday_stats/mart.sqlite"));
    }
}
