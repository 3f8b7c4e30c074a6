// Configuration loading and parsing (league.toml).
//
// Everything the engine needs from its environment arrives here
// explicitly at construction time; there is no ambient global state.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::draft::ledger::LeagueRules;
use crate::draft::pick::Position;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// The full parsed league.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub league: LeagueConfig,
    pub draft: DraftConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub salary_cap: u32,
    pub roster_size: u32,
    #[serde(default = "default_min_bid")]
    pub min_bid: u32,
    /// Canonical position list, as raw strings (validated to be
    /// parseable at load time).
    pub positions: Vec<String>,
}

impl LeagueConfig {
    /// The economic/roster rules bundle the draft modules consume.
    pub fn rules(&self) -> LeagueRules {
        LeagueRules {
            salary_cap: self.salary_cap,
            roster_size: self.roster_size,
            min_bid: self.min_bid,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftConfig {
    /// Per-nomination countdown duration.
    #[serde(default = "default_timer_seconds")]
    pub timer_seconds: u32,
    /// How often the session re-fetches pick history from the backend.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Session ids are stamped `<prefix>_<YYYY-MM-DD>`.
    #[serde(default = "default_session_prefix")]
    pub session_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// League backend base URL, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
}

fn default_min_bid() -> u32 {
    1
}

fn default_timer_seconds() -> u32 {
    10
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_session_prefix() -> String {
    "TEST".to_string()
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization
/// automatically.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let league_path = base_dir.join("config").join("league.toml");
    let league_text =
        std::fs::read_to_string(&league_path).map_err(|_| ConfigError::FileNotFound {
            path: league_path.clone(),
        })?;
    let config: Config = toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
        path: league_path,
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Ensure `config/league.toml` exists by copying it from `defaults/` if
/// missing. Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_path = base_dir.join("defaults").join("league.toml");
    let config_dir = base_dir.join("config");
    let target = config_dir.join("league.toml");

    if target.exists() {
        return Ok(vec![]);
    }
    if !defaults_path.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor defaults/league.toml found in {}; \
                 run from the project root or ensure defaults/ is present",
                target.display(),
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&defaults_path, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", defaults_path.display()),
    })?;

    Ok(vec![target])
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying the default league.toml first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.salary_cap == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.salary_cap".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.league.roster_size == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.roster_size".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.league.min_bid == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.min_bid".into(),
            message: "must be at least 1".into(),
        });
    }

    // Every slot must be fillable at the minimum bid.
    let floor = config.league.roster_size.saturating_mul(config.league.min_bid);
    if floor > config.league.salary_cap {
        return Err(ConfigError::ValidationError {
            field: "league.salary_cap".into(),
            message: format!(
                "cap {} cannot fill {} slots at min bid {}",
                config.league.salary_cap, config.league.roster_size, config.league.min_bid
            ),
        });
    }

    if config.league.positions.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.positions".into(),
            message: "must list at least one position".into(),
        });
    }
    for pos in &config.league.positions {
        if Position::from_raw(pos).is_none() {
            return Err(ConfigError::ValidationError {
                field: "league.positions".into(),
                message: format!("unknown position code {pos:?}"),
            });
        }
    }

    if config.draft.timer_seconds == 0 {
        return Err(ConfigError::ValidationError {
            field: "draft.timer_seconds".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.api.base_url.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const VALID_LEAGUE_TOML: &str = r#"
[league]
name = "Test League"
salary_cap = 200
roster_size = 14
min_bid = 1
positions = ["QB", "RB", "WR", "TE", "K", "DEF"]

[draft]
timer_seconds = 10
poll_interval_ms = 3000
session_prefix = "TEST"

[api]
base_url = "http://127.0.0.1:8000"
"#;

    /// Helper: write a league.toml under a fresh temp base dir.
    fn write_config(dir_name: &str, contents: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(dir_name);
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("league.toml"), contents).unwrap();
        tmp
    }

    #[test]
    fn load_valid_config() {
        let tmp = write_config("auction_config_valid", VALID_LEAGUE_TOML);
        let config = load_config_from(&tmp).expect("should load valid config");

        assert_eq!(config.league.name, "Test League");
        assert_eq!(config.league.salary_cap, 200);
        assert_eq!(config.league.roster_size, 14);
        assert_eq!(config.league.min_bid, 1);
        assert_eq!(config.league.positions.len(), 6);
        assert_eq!(config.draft.timer_seconds, 10);
        assert_eq!(config.draft.poll_interval_ms, 3000);
        assert_eq!(config.draft.session_prefix, "TEST");
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rules_conversion() {
        let tmp = write_config("auction_config_rules", VALID_LEAGUE_TOML);
        let config = load_config_from(&tmp).unwrap();
        let rules = config.league.rules();
        assert_eq!(rules.salary_cap, 200);
        assert_eq!(rules.roster_size, 14);
        assert_eq!(rules.min_bid, 1);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn draft_section_defaults_apply() {
        let toml = r#"
[league]
name = "Defaults"
salary_cap = 200
roster_size = 14
positions = ["QB"]

[draft]

[api]
base_url = "http://127.0.0.1:8000"
"#;
        let tmp = write_config("auction_config_defaults", toml);
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.league.min_bid, 1);
        assert_eq!(config.draft.timer_seconds, 10);
        assert_eq!(config.draft.poll_interval_ms, 3000);
        assert_eq!(config.draft.session_prefix, "TEST");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_salary_cap() {
        let toml = VALID_LEAGUE_TOML.replace("salary_cap = 200", "salary_cap = 0");
        let tmp = write_config("auction_config_zero_cap", &toml);
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "league.salary_cap");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_roster_size() {
        let toml = VALID_LEAGUE_TOML.replace("roster_size = 14", "roster_size = 0");
        let tmp = write_config("auction_config_zero_roster", &toml);
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "league.roster_size");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_cap_below_roster_floor() {
        // 14 slots at min bid 1 need at least $14.
        let toml = VALID_LEAGUE_TOML.replace("salary_cap = 200", "salary_cap = 10");
        let tmp = write_config("auction_config_cap_floor", &toml);
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "league.salary_cap");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_unknown_position_code() {
        let toml = VALID_LEAGUE_TOML.replace("\"DEF\"", "\"LW\"");
        let tmp = write_config("auction_config_bad_pos", &toml);
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "league.positions");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn legacy_td_position_code_is_accepted() {
        let toml = VALID_LEAGUE_TOML.replace("\"DEF\"", "\"TD\"");
        let tmp = write_config("auction_config_td_pos", &toml);
        assert!(load_config_from(&tmp).is_ok());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_timer() {
        let toml = VALID_LEAGUE_TOML.replace("timer_seconds = 10", "timer_seconds = 0");
        let tmp = write_config("auction_config_zero_timer", &toml);
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "draft.timer_seconds");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found() {
        let tmp = std::env::temp_dir().join("auction_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => {
                assert!(path.ends_with("league.toml"));
            }
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = write_config("auction_config_invalid", "this is not valid [[[ toml");
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => {
                assert!(path.ends_with("league.toml"));
            }
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_default() {
        let tmp = std::env::temp_dir().join("auction_config_ensure");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults/league.toml"), VALID_LEAGUE_TOML).unwrap();

        let copied = ensure_config_files(&tmp).expect("should copy default");
        assert_eq!(copied.len(), 1);
        assert!(tmp.join("config/league.toml").exists());

        // A second run is a no-op.
        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_preserves_existing() {
        let tmp = std::env::temp_dir().join("auction_config_ensure_existing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("defaults/league.toml"), VALID_LEAGUE_TOML).unwrap();
        fs::write(tmp.join("config/league.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());
        let content = fs::read_to_string(tmp.join("config/league.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_missing() {
        let tmp = std::env::temp_dir().join("auction_config_ensure_neither");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_files(&tmp).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("defaults/league.toml"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }
}
