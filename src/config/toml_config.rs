use crate::core::ConfigProvider;
use crate::utils::error::{OrderError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub order: OrderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    pub default_game: Option<String>,
    #[serde(default = "default_submission_timeout")]
    pub submission_timeout_seconds: Option<u64>,
    #[serde(default = "default_catalogue_limit")]
    pub catalogue_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_submission_timeout() -> Option<u64> {
    Some(20)
}

fn default_catalogue_limit() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            default_game: None,
            submission_timeout_seconds: default_submission_timeout(),
            catalogue_limit: default_catalogue_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// 只指定 API 位址，其餘使用預設值
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                request_timeout_seconds: default_request_timeout(),
                headers: BTreeMap::new(),
            },
            order: OrderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OrderError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OrderError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_TOKEN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OrderError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn default_game(&self) -> Option<&str> {
        self.order.default_game.as_deref()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_range(
            "api.request_timeout_seconds",
            self.api.request_timeout_seconds,
            1,
            300,
        )?;

        if let Some(timeout) = self.order.submission_timeout_seconds {
            validation::validate_range("order.submission_timeout_seconds", timeout, 1, 600)?;
        }
        validation::validate_positive_number("order.catalogue_limit", self.order.catalogue_limit, 1)?;
        if let Some(game) = &self.order.default_game {
            validation::validate_non_empty_string("order.default_game", game)?;
        }

        validation::validate_one_of("logging.level", &self.logging.level, &LOG_LEVELS)?;
        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn base_url(&self) -> &str {
        &self.api.base_url
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.api.request_timeout_seconds
    }

    fn submission_timeout_seconds(&self) -> Option<u64> {
        self.order.submission_timeout_seconds
    }

    fn catalogue_limit(&self) -> usize {
        self.order.catalogue_limit
    }

    fn extra_headers(&self) -> Vec<(String, String)> {
        self.api
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
[api]
base_url = "https://api.example.com"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout_seconds(), 30);
        assert_eq!(config.submission_timeout_seconds(), Some(20));
        assert_eq!(config.catalogue_limit(), 1000);
        assert_eq!(config.logging.level, "info");
        assert!(config.default_game().is_none());
    }

    #[test]
    fn test_full_config_with_env_substitution() {
        std::env::set_var("TOPUP_TEST_HOST", "api.topup.test");
        let config = AppConfig::from_toml_str(
            r#"
[api]
base_url = "https://${TOPUP_TEST_HOST}/v1"
request_timeout_seconds = 10
headers = { "ngrok-skip-browser-warning" = "true", "X-Client" = "cli" }

[order]
default_game = "Mobile Legends"
submission_timeout_seconds = 15
catalogue_limit = 200

[logging]
level = "debug"
json = true
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), "https://api.topup.test/v1");
        assert_eq!(config.default_game(), Some("Mobile Legends"));
        assert_eq!(
            config.extra_headers(),
            vec![
                ("X-Client".to_string(), "cli".to_string()),
                ("ngrok-skip-browser-warning".to_string(), "true".to_string()),
            ]
        );
        assert!(config.logging.json);
    }

    #[test]
    fn test_unknown_env_var_is_left_in_place() {
        let out = AppConfig::substitute_env_vars("token = \"${TOPUP_SURELY_UNSET_VAR}\"").unwrap();
        assert_eq!(out, "token = \"${TOPUP_SURELY_UNSET_VAR}\"");
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let mut config = AppConfig::new("https://api.example.com");
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::new("https://api.example.com");
        config.order.submission_timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        assert!(AppConfig::new("not a url").validate().is_err());
    }

    #[test]
    fn test_missing_api_section_is_config_error() {
        let err = AppConfig::from_toml_str("[order]\ncatalogue_limit = 5\n").unwrap_err();
        assert!(matches!(err, OrderError::ConfigError { .. }));
    }
}
