// src/main.rs
use std::path::PathBuf;
use std::process::ExitCode;

use analyzer::banner;
use analyzer::client::HttpAnalysisClient;
use analyzer::config::AppConfig;
use analyzer::controller::{AnalysisController, Output};
use analyzer::errors::{AnalyzerError, Result};
use analyzer::input::{AttachedFile, ImportOrigin};
use analyzer::preferences::FilePreferences;
use analyzer::summary::ReportSummary;
use clap::{Parser, Subcommand, ValueEnum};

/// Command-line client for the security Analysis API.
///
/// Sends a description of an internal system (typed or from a file) to the
/// backend, prints the returned JSON report and can save it as
/// `security_report.json`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Skip the startup banner.
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a system description for analysis.
    Analyze {
        /// Description text. Wins over any file when not blank.
        #[arg(short, long)]
        text: Option<String>,

        /// Load a file into the description, as the file picker does.
        #[arg(short, long, conflicts_with = "dropped")]
        file: Option<PathBuf>,

        /// Load a file as if dropped on the form. Only .txt / text/plain is accepted.
        #[arg(long = "drop", value_name = "DROP")]
        dropped: Option<PathBuf>,

        /// Attach a file for multipart upload without reading it into the text.
        #[arg(short, long, conflicts_with_all = ["file", "dropped"])]
        upload: Option<PathBuf>,

        /// Directory in which to save `security_report.json`.
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Show or flip the persisted analysis mode.
    Mode {
        #[arg(value_enum, default_value_t = ModeAction::Show)]
        action: ModeAction,
    },

    /// Check that the Analysis API is reachable.
    Health,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeAction {
    Show,
    Toggle,
}

type Controller = AnalysisController<HttpAnalysisClient, FilePreferences>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.quiet {
        banner::print_banner();
    }

    // .env may set RUST_LOG, so load it before the logger reads the environment
    let dotenv = dotenvy::dotenv();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    if let Err(e) = dotenv {
        log::debug!("No .env file loaded: {}", e);
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Analyze {
            text,
            file,
            dropped,
            upload,
            export,
        } => run_analyze(&config, text, file, dropped, upload, export).await,
        Command::Mode { action } => run_mode(&config, action),
        Command::Health => run_health(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_user_alert() => {
            eprintln!("⚠️  {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_controller(config: &AppConfig) -> Controller {
    let prefs_path = config
        .prefs_path
        .clone()
        .unwrap_or_else(FilePreferences::default_path);
    let client = HttpAnalysisClient::new(reqwest::Client::new(), config.api_base.clone());
    AnalysisController::new(client, FilePreferences::new(prefs_path))
        .with_timeout(config.request_timeout)
}

async fn run_analyze(
    config: &AppConfig,
    text: Option<String>,
    file: Option<PathBuf>,
    dropped: Option<PathBuf>,
    upload: Option<PathBuf>,
    export: Option<PathBuf>,
) -> Result<()> {
    let mut controller = build_controller(config);

    if let Some(path) = upload {
        controller.attach_file(AttachedFile::from_path(path));
    }
    if let Some(path) = file {
        controller.import_local_file(path, ImportOrigin::Picker).await?;
    }
    if let Some(path) = dropped {
        controller.import_local_file(path, ImportOrigin::Drop).await?;
    }
    if let Some(text) = text {
        controller.set_input_text(text);
    }

    println!(
        "🔎 Analyzing against {} ({} mode)... this can take several minutes.",
        config.api_base,
        controller.mode()
    );

    let outcome = tokio::select! {
        outcome = controller.submit() => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };

    match outcome {
        Some(result) => result?,
        None => return Err(AnalyzerError::Cancelled),
    }

    if let Output::Report(rendered) = controller.view().output {
        println!("\n{}", rendered);
    }

    if let Some(report) = controller.report() {
        let summary = ReportSummary::from_report(report);
        if !summary.is_empty() {
            println!("\n--- ✅ Analysis completed ---\n{}", summary);
        }
    }
    if let Some(session) = controller.session_id() {
        println!("🧾 Session: {}", session);
    }

    if let Some(dir) = export {
        if let Some(path) = controller.export_report(&dir).await? {
            println!("💾 Report saved to {}", path.display());
        }
    }

    Ok(())
}

fn run_mode(config: &AppConfig, action: ModeAction) -> Result<()> {
    let mut controller = build_controller(config);
    if action == ModeAction::Toggle {
        controller.toggle_mode()?;
    }
    println!("Analysis mode: {}", controller.mode());
    Ok(())
}

async fn run_health(config: &AppConfig) -> Result<()> {
    let client = HttpAnalysisClient::new(reqwest::Client::new(), config.api_base.clone());
    let body = client.health().await?;
    println!("✅ {} is up: {}", client.api_base(), body);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_cannot_be_combined_with_an_import() {
        let with_file = Cli::try_parse_from([
            "security-analyzer", "analyze", "--upload", "a.pdf", "--file", "b.txt",
        ]);
        assert!(with_file.is_err());

        let with_drop = Cli::try_parse_from([
            "security-analyzer", "analyze", "--upload", "a.pdf", "--drop", "b.txt",
        ]);
        assert!(with_drop.is_err());
    }

    #[test]
    fn test_upload_with_text_is_accepted() {
        let cli = Cli::try_parse_from([
            "security-analyzer", "analyze", "--upload", "a.pdf", "--text", "context",
        ])
        .unwrap();
        match cli.command {
            Command::Analyze { upload, text, .. } => {
                assert_eq!(upload, Some(PathBuf::from("a.pdf")));
                assert_eq!(text.as_deref(), Some("context"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
