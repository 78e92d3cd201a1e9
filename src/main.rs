use anyhow::Context;
use clap::Parser;
use heparin_nomogram::utils::{logger, validation::Validate};
use std::io::Write;
use heparin_nomogram::{evaluate_input, CliConfig, NomogramError, Report};

fn report_failure(e: &NomogramError) -> ! {
    tracing::error!(
        "❌ Evaluation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if let Err(e) = config.validate() {
        report_failure(&e);
    }

    // 先讀設定檔，[logging] 才能影響日誌設定
    let file_config = match config.load_file_config() {
        Ok(file_config) => file_config,
        Err(e) => report_failure(&e),
    };

    let logging = config.logging_options(&file_config);
    if logging.json {
        logger::init_json_logger(logging.verbose);
    } else {
        logger::init_cli_logger(logging.verbose);
    }

    tracing::debug!("CLI config: {:?}", config);

    let request = config.resolve(&file_config);
    tracing::info!(
        "💉 Evaluating {} protocol at {} units/ml",
        request.protocol,
        request.concentration.units_per_ml()
    );

    let recommendation = match evaluate_input(request.protocol, request.concentration, &request.input) {
        Ok(recommendation) => recommendation,
        Err(e) => report_failure(&e),
    };

    let report = Report::new(
        request.protocol,
        request.concentration,
        request.input,
        recommendation,
    );

    let output = match report.render(request.format) {
        Ok(output) => output,
        Err(e) => report_failure(&e),
    };

    writeln!(std::io::stdout().lock(), "{}", output.trim_end())
        .context("Failed to write report to stdout")?;

    Ok(())
}
