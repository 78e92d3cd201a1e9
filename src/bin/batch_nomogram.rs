use anyhow::Context;
use clap::Parser;
use heparin_nomogram::core::ConfigProvider;
use heparin_nomogram::utils::logger;
use heparin_nomogram::utils::validation::{validate_required_field, Validate};
use heparin_nomogram::{BatchEvaluator, LocalStorage, NomogramEngine, NomogramError, TomlConfig};
use std::io::Write;
use std::path::Path;

#[derive(Parser)]
#[command(name = "batch-nomogram")]
#[command(about = "Evaluate a CSV of patients against the heparin PTT nomogram")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "nomogram.toml")]
    config: String,

    /// Override batch.input from config
    #[arg(short, long)]
    input: Option<String>,

    /// Override batch.output_path from config
    #[arg(short, long)]
    output: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

fn fail(e: &NomogramError) -> ! {
    tracing::error!(
        "❌ Batch failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = if Path::new(&args.config).exists() {
        match TomlConfig::from_file(&args.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
                eprintln!("💡 Make sure the file is valid TOML format");
                std::process::exit(1);
            }
        }
    } else {
        TomlConfig::default()
    };

    let verbose = args.verbose || config.logging.verbose;
    if config.logging.json {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting batch nomogram evaluation");
    tracing::info!("📁 Configuration: {}", args.config);

    // 套用命令列覆蓋設定
    if let Some(input) = args.input {
        config.batch.input = Some(input);
    }
    if let Some(output) = args.output {
        config.batch.output_path = output;
    }

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let input = match validate_required_field("batch.input", &config.batch.input) {
        Ok(input) => input.clone(),
        Err(e) => fail(&e),
    };

    let mut stdout = std::io::stdout().lock();
    display_config_summary(&mut stdout, &config, &input, args.dry_run)
        .context("Failed to write configuration summary")?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No evaluation will occur");
        return Ok(());
    }

    // 路徑相對於目前目錄 (絕對路徑直接使用)
    let storage = LocalStorage::new(".".to_string());
    let pipeline = BatchEvaluator::new(storage, config, input);
    let engine = NomogramEngine::new(pipeline);

    let summary = match engine.run() {
        Ok(summary) => summary,
        Err(e) => fail(&e),
    };

    writeln!(
        stdout,
        "✅ Evaluated {} patients ({} succeeded, {} failed)",
        summary.total, summary.succeeded, summary.failed
    )
    .context("Failed to write batch summary")?;
    for path in &summary.outputs {
        writeln!(stdout, "📁 Output saved to: {}", path).context("Failed to write batch summary")?;
    }

    Ok(())
}

fn display_config_summary(
    out: &mut impl Write,
    config: &TomlConfig,
    input: &str,
    dry_run: bool,
) -> std::io::Result<()> {
    writeln!(out, "📋 Configuration Summary:")?;
    writeln!(out, "  Input: {}", input)?;
    writeln!(out, "  Output: {}", config.batch.output_path)?;
    writeln!(out, "  Formats: {}", config.batch.output_formats.join(", "))?;
    writeln!(out, "  Default protocol: {}", config.default_protocol())?;
    writeln!(
        out,
        "  Default concentration: {} ({} units/ml)",
        config.default_concentration(),
        config.default_concentration().units_per_ml()
    )?;

    if dry_run {
        writeln!(out, "  🔍 DRY RUN MODE ENABLED")?;
    }

    writeln!(out)
}
