use clap::Parser;
use contact_sync_etl::core::ConfigProvider;
use contact_sync_etl::utils::error::ErrorSeverity;
use contact_sync_etl::utils::{logger, validation::Validate};
use contact_sync_etl::{
    BatchReport, CliConfig, EtlEngine, FileOutcomeRecorder, HttpContactClient, LocalStorage,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse().with_env_credentials();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting contact-sync-etl");
    tracing::debug!(
        "Endpoint: {}, upload: {}, output: {}",
        config.api_endpoint(),
        config.input_path(),
        config.output_path()
    );

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(e.severity()));
    }

    let storage = LocalStorage::new(".".to_string());
    let client = HttpContactClient::from_config(&config)?;
    let recorder = FileOutcomeRecorder::new(storage.clone(), config.output_path());
    let engine = EtlEngine::new_with_monitoring(
        storage,
        client,
        recorder,
        config.input_path(),
        config.monitor,
    );

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No contacts will be created");
        for preview in engine.dry_run().await? {
            println!("{}: {} row(s)", preview.file_name, preview.rows);
        }
        return Ok(());
    }

    let report = engine.run().await;
    print_report(&report);

    if config.fail_on_error && !report.is_complete() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(report: &BatchReport) {
    println!(
        "📁 Files processed: {}, skipped (empty): {}",
        report.processed_files.len(),
        report.skipped_files.len()
    );
    println!(
        "👥 Contacts created: {}, failed: {}, not recorded: {}",
        report.rows_succeeded, report.rows_failed, report.rows_errored
    );
    match (&report.failed_at_file, &report.error) {
        (Some(file), Some(error)) => eprintln!("❌ Stopped at {}: {}", file, error),
        (None, Some(error)) => eprintln!("❌ Batch failed: {}", error),
        _ => {}
    }
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
