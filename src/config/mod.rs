pub mod cli;
pub mod toml_config;

/// Freshdesk 風格的 API key 認證：key 當帳號，密碼固定為 X
pub const DEFAULT_API_PASSWORD: &str = "X";
pub const API_USERNAME_ENV: &str = "CRM_API_USERNAME";
pub const API_PASSWORD_ENV: &str = "CRM_API_PASSWORD";

#[cfg(feature = "cli")]
pub use self::args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use super::{API_PASSWORD_ENV, API_USERNAME_ENV, DEFAULT_API_PASSWORD};
    use crate::core::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "contact-sync-etl")]
    #[command(about = "Sync contacts from uploaded spreadsheets to the CRM")]
    pub struct CliConfig {
        #[arg(long)]
        pub api_endpoint: String,

        #[arg(long, help = "API username (falls back to CRM_API_USERNAME)")]
        pub api_username: Option<String>,

        #[arg(long, help = "API password (falls back to CRM_API_PASSWORD, then X)")]
        pub api_password: Option<String>,

        #[arg(long, default_value = "./upload")]
        pub input_path: String,

        #[arg(long, default_value = "./doneData")]
        pub output_path: String,

        #[arg(long, help = "Per-request timeout in seconds (default: none)")]
        pub request_timeout: Option<u64>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log memory and throughput per file")]
        pub monitor: bool,

        #[arg(long, help = "List files and row counts without syncing")]
        pub dry_run: bool,

        #[arg(long, help = "Exit non-zero when the batch stops early")]
        pub fail_on_error: bool,
    }

    impl CliConfig {
        /// 命令列沒給的帳密改從環境變數讀取
        pub fn with_env_credentials(mut self) -> Self {
            if self.api_username.is_none() {
                self.api_username = std::env::var(API_USERNAME_ENV).ok();
            }
            if self.api_password.is_none() {
                self.api_password = std::env::var(API_PASSWORD_ENV).ok();
            }
            self
        }
    }

    impl ConfigProvider for CliConfig {
        fn api_endpoint(&self) -> &str {
            &self.api_endpoint
        }

        fn api_username(&self) -> &str {
            self.api_username.as_deref().unwrap_or_default()
        }

        fn api_password(&self) -> &str {
            self.api_password.as_deref().unwrap_or(DEFAULT_API_PASSWORD)
        }

        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn request_timeout_seconds(&self) -> Option<u64> {
            self.request_timeout
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_url("api_endpoint", &self.api_endpoint)?;
            let username = validation::validate_required_field("api_username", &self.api_username)?;
            validation::validate_non_empty_string("api_username", username)?;
            validation::validate_path("input_path", &self.input_path)?;
            validation::validate_path("output_path", &self.output_path)?;
            validation::validate_distinct_paths("output_path", &self.input_path, &self.output_path)?;
            if let Some(timeout) = self.request_timeout {
                validation::validate_positive_number("request_timeout", timeout, 1)?;
            }
            Ok(())
        }
    }

}
