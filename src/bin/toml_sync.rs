use clap::Parser;
use contact_sync_etl::core::ConfigProvider;
use contact_sync_etl::utils::{logger, validation::Validate};
use contact_sync_etl::{EtlEngine, FileOutcomeRecorder, HttpContactClient, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-sync")]
#[command(about = "Contact sync driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "contact-sync.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("📁 Loaded configuration '{}' from {}", config.pipeline.name, args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    let storage = LocalStorage::new(".".to_string());
    let client = HttpContactClient::from_config(&config)?;
    let recorder = FileOutcomeRecorder::new(storage.clone(), config.output_path());
    let engine = EtlEngine::new_with_monitoring(
        storage,
        client,
        recorder,
        config.input_path(),
        monitor_enabled,
    );

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No contacts will be created");
        for preview in engine.dry_run().await? {
            println!("{}: {} row(s)", preview.file_name, preview.rows);
        }
        return Ok(());
    }

    let report = engine.run().await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
