pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use crate::core::{
    etl::EtlEngine, recorder::FileOutcomeRecorder, sync_client::HttpContactClient,
};
pub use domain::model::{BatchReport, ContactPayload, Record};
pub use utils::error::{EtlError, Result};
