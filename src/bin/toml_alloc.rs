use anyhow::Context;
use clap::Parser;
use slot_alloc::core::ConfigProvider;
use slot_alloc::utils::{logger, validation::Validate};
use slot_alloc::{CsvPipeline, LocalStorage, PipelineEngine, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-alloc")]
#[command(about = "Slot allocation driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "alloc-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be processed without reading or writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = TomlConfig::from_file(&args.config).with_context(|| {
        format!(
            "failed to load config file '{}' (make sure it exists and is valid TOML)",
            args.config
        )
    })?;

    logger::init_cli_logger_with_level(args.verbose, config.log_level());
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let run_name = config.run.name.clone();

    let pipeline = CsvPipeline::new(LocalStorage::new("."), config);
    let engine = PipelineEngine::new_with_monitoring(pipeline, monitor_enabled);

    let summary = match engine.run().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(
                "❌ Run '{}' failed: {} (Category: {:?}, Severity: {:?})",
                run_name,
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    println!("{}", summary.report);
    println!("📁 Output saved to: {}", summary.output_path);

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Run: {}", config.run.name);
    if let Some(description) = &config.run.description {
        tracing::info!("   {}", description);
    }
    tracing::info!("📥 Input: {}", config.input());
    if config.slots().is_empty() {
        tracing::info!("🎯 Slots: every column except '{}'", config.name_column());
    } else {
        tracing::info!("🎯 Slots ({}): {}", config.slots().len(), config.slots().join(", "));
    }
    tracing::info!("📤 Output: {} as {}", config.output_path(), config.output_formats().join(", "));
    if let Some(archive) = config.archive_name() {
        tracing::info!("🗜️ Bundled into: {}", archive);
    }
}
