use clap::Parser;
use tidy_csv::core::cleaner::clean_csv;
use tidy_csv::core::{ConfigProvider, Pipeline};
use tidy_csv::utils::{logger, validation::Validate};
use tidy_csv::{CsvCleanPipeline, EtlEngine, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-clean")]
#[command(about = "CSV cleaning driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "tidy-csv.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Clean the input and print statistics without writing any output
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置 (日誌尚未初始化，直接輸出到 stderr)
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.log_level() == Some("debug");
    logger::init_cli_logger(verbose);

    tracing::info!("🚀 Starting TOML-based CSV cleaning");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::default();
    let pipeline = CsvCleanPipeline::new(storage, config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        perform_dry_run(&pipeline).await;
        return Ok(());
    }

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ CSV cleaned successfully!");
            println!("✅ CSV cleaned successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Cleaning failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    match &config.pipeline.version {
        Some(version) => println!("  Pipeline: {} v{}", config.pipeline.name, version),
        None => println!("  Pipeline: {}", config.pipeline.name),
    }
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if config.compression_enabled() {
        println!(
            "  Compression: {}",
            config.archive_name().unwrap_or("<input>_report.zip")
        );
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(pipeline: &CsvCleanPipeline<LocalStorage, TomlConfig>) {
    println!("🔍 Dry Run Analysis:");
    println!();

    let text = match pipeline.extract().await {
        Ok(text) => text,
        Err(e) => {
            println!("  ❌ Could not read input: {}", e.user_friendly_message());
            println!("  💡 {}", e.recovery_suggestion());
            return;
        }
    };

    let report = clean_csv(&text);
    let stats = &report.stats;

    println!("🧹 Cleaning Preview:");
    println!("  Columns: {}", report.dataset.headers.join(", "));
    println!("  Original rows: {}", stats.original_rows);
    println!("  Cleaned rows: {}", stats.cleaned_rows);
    println!("  Removed blank rows: {}", stats.removed_blank);
    println!("  Repaired rows: {}", stats.repaired_rows);
    println!("  Rows with invalid dates: {}", stats.invalid_dates);
    println!("  Total amount: ${:.2}", stats.total_amount);

    if !report.warnings.is_empty() {
        println!();
        println!("⚠️ Warnings:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }

    if report.dataset.is_empty() {
        println!();
        println!("  ⚠️ No complete rows, a real run would not write any output");
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
