use std::{io, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use client_core::{HttpAnalysisTransport, LifecycleState, SubmissionController};
use shared::domain::SubmissionPayload;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod terminal;

use terminal::{OutputFormat, TerminalControl, TerminalDisplay};

#[derive(Parser, Debug)]
#[command(
    name = "gene-screen",
    version,
    about = "Submit DNA sequences to the analysis service and show the findings"
)]
struct Cli {
    /// Root URL of the analysis service
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Settings file (defaults to ./gene_screen.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit one sequence and print the result
    Analyze(AnalyzeArgs),
    /// Prompt for sequences on stdin until a blank line
    Interactive(InteractiveArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    #[arg(long, conflicts_with = "sequence_file", required_unless_present = "sequence_file")]
    sequence: Option<String>,
    /// Plain or FASTA file holding the sequence
    #[arg(long)]
    sequence_file: Option<PathBuf>,
    #[arg(long)]
    age: Option<String>,
    /// M or F
    #[arg(long)]
    gender: Option<String>,
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct InteractiveArgs {
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn output_format(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(server_url) = &cli.server_url {
        settings.server_url = config::normalize_server_url(server_url);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let transport =
        HttpAnalysisTransport::with_timeout(&settings.server_url, settings.request_timeout())?;
    info!(endpoint = %transport.endpoint(), "analysis service configured");
    let transport = Arc::new(transport);

    match cli.command {
        Command::Analyze(args) => run_analyze(transport, args).await,
        Command::Interactive(args) => run_interactive(transport, args).await,
    }
}

async fn run_analyze(
    transport: Arc<HttpAnalysisTransport>,
    args: AnalyzeArgs,
) -> Result<ExitCode> {
    let sequence = match (args.sequence, &args.sequence_file) {
        (Some(sequence), _) => sequence,
        (None, Some(path)) => input::read_sequence_file(path)?,
        (None, None) => anyhow::bail!("either --sequence or --sequence-file is required"),
    };
    let payload = SubmissionPayload::from_form_values(
        &sequence,
        args.age.as_deref().unwrap_or_default(),
        args.gender.as_deref().unwrap_or_default(),
    )?;

    let controller = SubmissionController::new(
        transport,
        Arc::new(TerminalDisplay::new(output_format(args.json))),
        Arc::new(TerminalControl::new()),
    );

    match controller.submit(payload).await {
        LifecycleState::Rendered => Ok(ExitCode::SUCCESS),
        _ => Ok(ExitCode::FAILURE),
    }
}

async fn run_interactive(
    transport: Arc<HttpAnalysisTransport>,
    args: InteractiveArgs,
) -> Result<ExitCode> {
    let control = Arc::new(TerminalControl::new());
    let controller = SubmissionController::new(
        transport,
        Arc::new(TerminalDisplay::new(output_format(args.json))),
        control.clone(),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut submissions = 0usize;
    loop {
        let mut prompt = io::stderr();
        let Some(form) = input::prompt_form(&mut lines, &mut prompt, &control.label()).await? else {
            break;
        };

        let payload =
            match SubmissionPayload::from_form_values(&form.sequence, &form.age, &form.gender) {
                Ok(payload) => payload,
                Err(err) => {
                    eprintln!("[error] {err}");
                    continue;
                }
            };

        controller.submit(payload).await;
        submissions += 1;
    }

    info!(submissions, "interactive session finished");
    Ok(ExitCode::SUCCESS)
}
