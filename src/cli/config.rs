use crate::error::{Result, StyleError};
use crate::types::StrictMode;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub theme: Option<String>,
    pub platform: Option<String>,
    pub strict_mode: Option<StrictMode>,
    pub debug: Option<bool>,
    pub viewport_width: Option<f32>,
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    let config_content = fs::read_to_string(config_path).map_err(|e| StyleError::FileNotFound {
        path: format!("Config file {}: {}", config_path, e),
    })?;

    let config = if config_path.ends_with(".json") {
        serde_json::from_str(&config_content).map_err(|e| StyleError::InvalidFormat {
            message: format!("Invalid JSON config: {}", e),
        })?
    } else if config_path.ends_with(".toml") {
        toml::from_str(&config_content).map_err(|e| StyleError::InvalidFormat {
            message: format!("Invalid TOML config: {}", e),
        })?
    } else {
        return Err(StyleError::InvalidFormat {
            message: "Config file must be .json or .toml format".to_string(),
        });
    };

    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_toml_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "theme = \"theme.json\"").unwrap();
        writeln!(file, "platform = \"ios\"").unwrap();
        writeln!(file, "strict_mode = \"warn\"").unwrap();
        writeln!(file, "viewport_width = 1024.0").unwrap();

        let config = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.theme.as_deref(), Some("theme.json"));
        assert_eq!(config.platform.as_deref(), Some("ios"));
        assert_eq!(config.strict_mode, Some(StrictMode::Warn));
        assert_eq!(config.viewport_width, Some(1024.0));
        assert_eq!(config.debug, None);
    }

    #[test]
    fn test_load_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "debug": true, "strict_mode": "error" }}"#).unwrap();

        let config = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.debug, Some(true));
        assert_eq!(config.strict_mode, Some(StrictMode::Error));
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            load(file.path().to_str().unwrap()),
            Err(StyleError::InvalidFormat { .. })
        ));
    }
}
