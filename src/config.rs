//! Configuration (`~/.fitday/config.json`).
//!
//! Loaded once at startup; every field has a serde default so a partial file
//! from an older build keeps working.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::prompts::DEFAULT_END_OF_DAY_HOUR;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Base URL of the coaching backend.
    pub backend_url: String,
    /// User identifier sent on every call.
    pub user_id: String,
    /// Local hour from which the end-of-day prompt becomes eligible.
    pub end_of_day_hour: u32,
    /// Minutes between background refreshes in the headless runner.
    pub refresh_interval_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            user_id: String::new(),
            end_of_day_hour: DEFAULT_END_OF_DAY_HOUR,
            refresh_interval_minutes: 15,
        }
    }
}

/// Get the canonical config file path (`~/.fitday/config.json`).
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".fitday").join("config.json"))
}

/// Load configuration from `~/.fitday/config.json`.
pub fn load_config() -> Result<Config, String> {
    let path = config_path()?;

    if !path.exists() {
        return Err(format!(
            "Config file not found at {}. Create it with: {{ \"backendUrl\": \"...\", \"userId\": \"...\" }}",
            path.display()
        ));
    }

    let content =
        fs::read_to_string(&path).map_err(|e| format!("Failed to read config: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Create or update the config file.
///
/// Starts from the existing file (or defaults on first run), applies the
/// mutator, ensures `~/.fitday/` exists, and writes the result back.
pub fn create_or_update_config(mutator: impl FnOnce(&mut Config)) -> Result<Config, String> {
    let mut config = load_config().unwrap_or_default();
    mutator(&mut config);

    let path = config_path()?;
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config dir: {}", e))?;
        }
    }

    let content = serde_json::to_string_pretty(&config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.end_of_day_hour, 20);
        assert_eq!(config.refresh_interval_minutes, 15);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "backendUrl": "https://api.fitday.example", "userId": "u-42" }"#,
        )
        .expect("partial config parses");
        assert_eq!(config.backend_url, "https://api.fitday.example");
        assert_eq!(config.user_id, "u-42");
        assert_eq!(config.end_of_day_hour, 20);
    }

    #[test]
    fn test_camel_case_round_trip() {
        let config = Config {
            backend_url: "https://api.fitday.example".to_string(),
            user_id: "u-42".to_string(),
            end_of_day_hour: 21,
            refresh_interval_minutes: 30,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["endOfDayHour"], 21);
        assert_eq!(json["refreshIntervalMinutes"], 30);
    }
}
