use serde::Deserialize;
use std::fs;

/// Fixed header lines for the printed OT form. Overridable from
/// `config.json` so the binary does not have to be rebuilt for a
/// different worker.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_worker_name")]
    pub worker_name: String,
    #[serde(default = "default_department")]
    pub department: String,
}

fn default_worker_name() -> String {
    "Khairul Reza".to_string()
}

fn default_department() -> String {
    "WH3 Transport".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_name: default_worker_name(),
            department: default_department(),
        }
    }
}

pub fn load_config() -> Config {
    let config_path = dirs::config_dir()
        .map(|p| p.join("otborang/config.json"))
        .or_else(|| dirs::home_dir().map(|p| p.join(".config/otborang/config.json")));

    if let Some(path) = config_path {
        if path.exists() {
            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(config) = serde_json::from_str(&content) {
                    return config;
                }
            }
        }
    }

    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.worker_name, "Khairul Reza");
        assert_eq!(config.department, "WH3 Transport");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"worker_name":"Ahmad"}"#).unwrap();
        assert_eq!(config.worker_name, "Ahmad");
        assert_eq!(config.department, "WH3 Transport");
    }
}
