use crate::config::DEFAULT_API_PASSWORD;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub crm: CrmConfig,
    pub extract: ExtractConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmConfig {
    pub endpoint: String,
    pub username: String,
    pub password: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub input_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CRM_API_USERNAME})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.crm.endpoint
    }

    fn api_username(&self) -> &str {
        &self.crm.username
    }

    fn api_password(&self) -> &str {
        self.crm.password.as_deref().unwrap_or(DEFAULT_API_PASSWORD)
    }

    fn input_path(&self) -> &str {
        &self.extract.input_path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.crm.timeout_seconds
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("crm.endpoint", &self.crm.endpoint)?;
        validation::validate_non_empty_string("crm.username", &self.crm.username)?;
        if self.crm.username.contains("${") {
            return Err(EtlError::MissingConfigError {
                field: format!("crm.username ({})", self.crm.username),
            });
        }
        validation::validate_path("extract.input_path", &self.extract.input_path)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_distinct_paths(
            "load.output_path",
            &self.extract.input_path,
            &self.load.output_path,
        )?;
        if let Some(timeout) = self.crm.timeout_seconds {
            validation::validate_positive_number("crm.timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_CONFIG: &str = r#"
[pipeline]
name = "contact-sync"

[crm]
endpoint = "https://crm.example.com/api/v2/contacts"
username = "agent-key"

[extract]
input_path = "./upload"

[load]
output_path = "./doneData"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC_CONFIG).unwrap();

        assert_eq!(config.pipeline.name, "contact-sync");
        assert_eq!(config.api_endpoint(), "https://crm.example.com/api/v2/contacts");
        assert_eq!(config.api_password(), "X");
        assert_eq!(config.input_path(), "./upload");
        assert_eq!(config.output_path(), "./doneData");
        assert!(!config.monitoring_enabled());
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CONTACT_SYNC_TEST_USERNAME", "key-from-env");

        let toml_content = r#"
[pipeline]
name = "env"

[crm]
endpoint = "https://crm.example.com/api/v2/contacts"
username = "${CONTACT_SYNC_TEST_USERNAME}"
password = "${CONTACT_SYNC_TEST_UNSET_PASSWORD}"
timeout_seconds = 30

[extract]
input_path = "./upload"

[load]
output_path = "./doneData"

[monitoring]
enabled = true
json_logs = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_username(), "key-from-env");
        assert_eq!(config.api_password(), "${CONTACT_SYNC_TEST_UNSET_PASSWORD}");
        assert_eq!(config.request_timeout_seconds(), Some(30));
        assert!(config.monitoring_enabled());
        assert!(config.json_logs());

        std::env::remove_var("CONTACT_SYNC_TEST_USERNAME");
    }

    #[test]
    fn test_unresolved_username_fails_validation() {
        let toml_content = BASIC_CONFIG.replace("agent-key", "${CONTACT_SYNC_TEST_NEVER_SET}");
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(EtlError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = BASIC_CONFIG.replace("https://crm.example.com/api/v2/contacts", "invalid-url");
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_section_is_a_parse_error() {
        let result = TomlConfig::from_toml_str("[pipeline]\nname = \"x\"\n");
        assert!(matches!(
            result,
            Err(EtlError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC_CONFIG.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "contact-sync");
    }
}
