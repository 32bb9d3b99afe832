//! Parley CLI - run and chat with lesson chatbots

mod console;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use parley_core::chatbot::ChatBotRegistry;
use parley_core::config::ParleyConfig;
use parley_core::lessons;
use parley_core::live::{LiveOptions, LiveSession};
use parley_core::testing::{ChatbotEvaluator, EvalOutcome, TestSuite};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::console::{ConsoleReporter, ConsoleRenderer};

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Run, test and chat with Parley lesson chatbots", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to parley.toml and PARLEY_* variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level, overriding the configuration
    #[arg(long, global = true, env = "PARLEY_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered chatbots
    List,
    /// Run a chatbot's test suite
    Test {
        /// Chatbot name
        name: String,

        /// Suite file (YAML or JSON) replacing the chatbot's own suite
        #[arg(short, long)]
        suite: Option<PathBuf>,

        /// Write the JSON report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Override the number of repetitions
        #[arg(short = 'n', long)]
        repetitions: Option<u32>,

        /// Show chatbot narration for every case
        #[arg(long)]
        show_status: bool,
    },
    /// Chat with a chatbot in the terminal
    Chat {
        /// Chatbot name
        name: String,
    },
    /// Version information
    Version,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ParleyConfig::from_file(path)?,
        None => ParleyConfig::load()?,
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    parley_core::logging::init(&config.logging);

    match cli.command {
        Commands::Version => {
            println!("parley {}", env!("CARGO_PKG_VERSION"));
            println!("parley-core {}", parley_core::VERSION);
            Ok(ExitCode::SUCCESS)
        }
        Commands::List => {
            let registry = build_registry(&config)?;
            for entry in registry.entries() {
                let suite = if entry.has_suite() { "" } else { " (no tests)" };
                println!("{:<28} {}{}", entry.name().cyan(), entry.description(), suite.dimmed());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Test {
            name,
            suite,
            report,
            repetitions,
            show_status,
        } => {
            let registry = build_registry(&config)?;
            run_tests(
                &registry,
                &config,
                &name,
                suite.as_deref(),
                report.as_deref(),
                repetitions,
                show_status,
            )
            .await
        }
        Commands::Chat { name } => {
            let registry = build_registry(&config)?;
            chat(&registry, &config, &name).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_registry(config: &ParleyConfig) -> Result<ChatBotRegistry> {
    let llm = Arc::new(
        lessons::offline_provider(&config.llm).context("Failed to set up the model provider")?,
    );
    Ok(lessons::default_registry(llm, &config.chat)?)
}

async fn run_tests(
    registry: &ChatBotRegistry,
    config: &ParleyConfig,
    name: &str,
    suite_path: Option<&Path>,
    report_path: Option<&Path>,
    repetitions: Option<u32>,
    show_status: bool,
) -> Result<ExitCode> {
    let mut suite = match suite_path {
        Some(path) => TestSuite::from_file(path)?,
        None => match registry.test_suite(name)? {
            Some(suite) => suite,
            None => bail!("Chatbot '{}' has no test suite; pass one with --suite", name),
        },
    };
    if let Some(repetitions) = repetitions {
        suite.repetitions = repetitions;
    }

    let chatbot = registry.load(name)?;
    let outcome = ChatbotEvaluator::new(chatbot)
        .with_config(&config.eval)
        .with_verbose(config.logging.is_verbose())
        .with_reporter(Arc::new(ConsoleReporter { show_status }))
        .run_test_suite(&suite)
        .await?;

    let report = match outcome {
        EvalOutcome::NothingToRun => {
            println!("Nothing to run");
            return Ok(ExitCode::SUCCESS);
        }
        EvalOutcome::Completed(report) => report,
    };

    if let Some(path) = report_path {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Wrote report");
    }

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn chat(registry: &ChatBotRegistry, config: &ParleyConfig, name: &str) -> Result<()> {
    let chatbot = registry.load(name)?;
    let options = LiveOptions::from_config(&config.eval, config.logging.is_verbose());

    println!("\n{} console (type /quit to exit)", chatbot.name().cyan().bold());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", ">>> ".green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "/quit" | "/exit") {
            break;
        }

        let mut renderer = ConsoleRenderer::new();
        let answer = LiveSession::start(chatbot.clone(), question, options.clone())
            .drain(&mut renderer)
            .await;

        if answer.is_complete() {
            println!("\n{}\n", answer.answer);
        } else {
            println!("\n{}\n", answer.answer.red());
        }
    }

    if let Err(e) = chatbot.reset().await {
        tracing::warn!(error = %e, "Failed to reset chatbot on exit");
    }
    Ok(())
}
