//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If none are set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. Falls back to built-in defaults when neither source exists
//!
//! ## Environment Variables
//! - `OPSBOARD_TIMEZONE`: IANA zone for local-day bucketing
//! - `OPSBOARD_LATE_THRESHOLD`: `"HH:MM"` lateness cutoff
//! - `OPSBOARD_LOG_LEVEL`: default tracing filter
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./opsboard.json` or `./opsboard.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use opsboard_domain::{
    AttendanceConfig, ClockTime, Config, LogConfig, OpsBoardError, Result,
};

/// Load configuration with automatic fallback strategy
///
/// Environment variables win when any are set; otherwise the probed config
/// file is used; otherwise the built-in defaults (every field has one).
///
/// # Errors
/// Returns `OpsBoardError::Config` if a present source is malformed: an
/// unparsable environment value or an invalid config file. A missing source
/// is not an error.
pub fn load() -> Result<Config> {
    if env_is_present() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }
    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration source found, using defaults");
            Ok(Config::default())
        }
    }
}

fn env_is_present() -> bool {
    ["OPSBOARD_TIMEZONE", "OPSBOARD_LATE_THRESHOLD", "OPSBOARD_LOG_LEVEL"]
        .iter()
        .any(|key| std::env::var_os(key).is_some())
}

/// Load configuration from environment variables
///
/// Unset variables keep their default values; set variables must parse.
///
/// # Errors
/// Returns `OpsBoardError::Config` for an invalid threshold or timezone.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let timezone = std::env::var("OPSBOARD_TIMEZONE").unwrap_or(defaults.timezone);
    let late_threshold = match std::env::var("OPSBOARD_LATE_THRESHOLD") {
        Ok(raw) => ClockTime::parse(&raw)
            .map_err(|e| OpsBoardError::Config(format!("Invalid late threshold: {e}")))?,
        Err(_) => defaults.attendance.late_threshold,
    };
    let level = std::env::var("OPSBOARD_LOG_LEVEL").unwrap_or(defaults.log.level);

    let config = Config {
        timezone,
        attendance: AttendanceConfig { late_threshold },
        log: LogConfig { level },
    };
    // Fail fast on a zone name the runtime cannot resolve.
    config.tz()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `OpsBoardError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(OpsBoardError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            OpsBoardError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| OpsBoardError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.tz()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| OpsBoardError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| OpsBoardError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(OpsBoardError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, up to two parent levels, and the
/// executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("opsboard.json"),
            cwd.join("opsboard.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("opsboard.json"),
                exe_dir.join("opsboard.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn clear_env() {
        std::env::remove_var("OPSBOARD_TIMEZONE");
        std::env::remove_var("OPSBOARD_LATE_THRESHOLD");
        std::env::remove_var("OPSBOARD_LOG_LEVEL");
    }

    #[test]
    fn env_values_override_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("OPSBOARD_TIMEZONE", "America/New_York");
        std::env::set_var("OPSBOARD_LATE_THRESHOLD", "09:30");
        std::env::set_var("OPSBOARD_LOG_LEVEL", "debug");

        let config = load_from_env().expect("env config should load");
        assert_eq!(config.timezone, "America/New_York");
        assert_eq!(config.attendance.late_threshold.as_str(), "09:30");
        assert_eq!(config.log.level, "debug");

        clear_env();
    }

    #[test]
    fn unset_env_vars_keep_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("OPSBOARD_LATE_THRESHOLD", "10:00");
        let config = load_from_env().expect("env config should load");
        assert_eq!(config.attendance.late_threshold.as_str(), "10:00");
        assert_eq!(config.timezone, Config::default().timezone);

        clear_env();
    }

    #[test]
    fn malformed_threshold_is_a_config_error() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("OPSBOARD_LATE_THRESHOLD", "ten past ten");
        let result = load_from_env();
        assert!(matches!(result, Err(OpsBoardError::Config(_))));

        clear_env();
    }

    #[test]
    fn unresolvable_timezone_is_rejected() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("OPSBOARD_TIMEZONE", "Mars/Olympus");
        let result = load_from_env();
        assert!(matches!(result, Err(OpsBoardError::Config(_))));

        clear_env();
    }

    #[test]
    fn load_from_file_json() {
        let json_content = r#"{
            "timezone": "Asia/Seoul",
            "attendance": { "late_threshold": "10:10" },
            "log": { "level": "info" }
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("JSON config should load");
        assert_eq!(config.timezone, "Asia/Seoul");
        assert_eq!(config.attendance.late_threshold.as_str(), "10:10");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_from_file_toml() {
        let toml_content = r#"
timezone = "Europe/Berlin"

[attendance]
late_threshold = "09:00"

[log]
level = "warn"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("TOML config should load");
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.attendance.late_threshold.as_str(), "09:00");
        assert_eq!(config.log.level, "warn");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(OpsBoardError::Config(_))));
    }

    #[test]
    fn load_from_file_invalid_json() {
        let invalid_json = r#"{ "this is": "not valid json" "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_json.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let result = load_from_file(Some(path.clone()));
        assert!(result.is_err(), "Should fail with invalid JSON");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn invalid_threshold_in_file_is_rejected() {
        let json_content = r#"{
            "timezone": "Asia/Seoul",
            "attendance": { "late_threshold": "25:99" },
            "log": { "level": "info" }
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let result = load_from_file(Some(path.clone()));
        assert!(matches!(result, Err(OpsBoardError::Config(_))));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let path = PathBuf::from("test.yaml");
        let result = parse_config("some content", &path);
        assert!(matches!(result, Err(OpsBoardError::Config(_))));
    }
}
