//! PlanDraft CLI entry point

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::debug;

use plandraft::cli::{Cli, Command, OutputFormat};
use plandraft::config::Config;
use plandraft::llm::{CompletionRequest, create_client};
use plandraft::prompts::{Composer, InteractionMode, PromptLoader, ReferenceDoc, Section, Turn};
use plandraft::session::{SessionRunner, StreamEvent, sse_frames};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let level = match cli_log_level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    // Generated text goes to stdout; diagnostics stay on stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = %cli_command_name(&cli.command), "main: dispatching command");
    match cli.command {
        Command::Chat {
            section,
            start,
            draft,
            history,
            references,
            format,
            no_stream,
        } => {
            cmd_chat(
                &config,
                &section,
                start,
                draft,
                history.as_ref(),
                &references,
                format,
                no_stream,
            )
            .await
        }
        Command::Sections => cmd_sections(),
    }
}

fn cli_command_name(command: &Command) -> &'static str {
    match command {
        Command::Chat { .. } => "chat",
        Command::Sections => "sections",
    }
}

#[allow(clippy::too_many_arguments)]
async fn cmd_chat(
    config: &Config,
    section: &str,
    start: bool,
    draft: bool,
    history_path: Option<&PathBuf>,
    reference_paths: &[PathBuf],
    format: OutputFormat,
    no_stream: bool,
) -> Result<()> {
    // Credential is a precondition: fail here, before any composition work
    config.validate()?;

    let mode = InteractionMode::from_flags(start, draft);
    let history = load_history(history_path)?;
    let references = load_references(reference_paths)?;

    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let composer = Composer::new(PromptLoader::new(root), config.compose.reference_char_budget);
    let instruction = composer
        .compose(mode, section, &history, &references)
        .context("Failed to compose instruction")?;

    debug!(
        ?mode,
        %section,
        instruction_len = instruction.len(),
        "cmd_chat: composed instruction"
    );

    let client = create_client(&config.llm)?;
    let request = CompletionRequest::new(instruction, config.llm.max_tokens);

    if no_stream {
        let text = client.complete(request).await?;
        println!("{}", text);
        return Ok(());
    }

    let runner = SessionRunner::new(client);
    let mut events = runner.run(request);

    let mut stdout = std::io::stdout();
    while let Some(event) = events.recv().await {
        match format {
            OutputFormat::Sse => {
                write!(stdout, "{}", sse_frames(&event))?;
                stdout.flush()?;
            }
            OutputFormat::Text => match &event {
                StreamEvent::Fragment(text) => {
                    write!(stdout, "{}", text)?;
                    stdout.flush()?;
                }
                StreamEvent::Done => {
                    writeln!(stdout)?;
                }
                StreamEvent::Failure(message) => {
                    writeln!(stdout)?;
                    eprintln!("{} {}", "error:".red().bold(), message);
                }
            },
        }
    }

    Ok(())
}

fn cmd_sections() -> Result<()> {
    for section in Section::ALL {
        match section.weight() {
            Some(weight) => println!("{:<14} {} ({})", section.id().bold(), section.title(), weight.dimmed()),
            None => println!("{:<14} {}", section.id().bold(), section.title()),
        }
    }
    Ok(())
}

fn load_history(path: Option<&PathBuf>) -> Result<Vec<Turn>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let content = fs::read_to_string(path).context(format!("Failed to read history file {}", path.display()))?;
    let history: Vec<Turn> =
        serde_json::from_str(&content).context(format!("Failed to parse history file {}", path.display()))?;

    debug!(turns = history.len(), "load_history: parsed");
    Ok(history)
}

fn load_references(paths: &[PathBuf]) -> Result<Vec<ReferenceDoc>> {
    paths
        .iter()
        .map(|path| {
            let content =
                fs::read_to_string(path).context(format!("Failed to read reference file {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(ReferenceDoc { name, content })
        })
        .collect()
}
