mod auth;
mod gemini;
mod logging;
mod output;
mod quota;
mod report;

use anyhow::{Context, Result};
use auth::AuthType;
use clap::Parser;
use gemini::accounts::GoogleAccountStore;
use gemini::config::GeminiConfig;
use output::{OutputMode, OutputSink, StdioSink};
use report::ReportOptions;
use std::process::ExitCode;
use tracing::Instrument;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GEMINI_USAGE_GIT_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "gemini-usage")]
#[command(about = "Show Gemini CLI account details and remaining API quota")]
#[command(version, long_version = LONG_VERSION)]
struct Cli {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Override authentication type
    #[arg(long, value_enum)]
    auth: Option<AuthType>,

    /// Display concise output
    #[arg(short, long)]
    short: bool,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        OutputMode::from_flags(self.json, self.short)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let mode = cli.output_mode();
    let mut sink = StdioSink::new(logging::init());

    match run(&cli, mode, &mut sink).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Err(write_err) =
                output::render_error(&format!("{:#}", e), mode).write_to(&mut sink)
            {
                tracing::error!("Failed to write error output: {}", write_err);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, mode: OutputMode, sink: &mut dyn OutputSink) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let options = ReportOptions::new(cli.auth.map(|a| a.to_string()), mode, cwd);

    let span = tracing::debug_span!("report", session_id = %options.session_id);
    report::run(&GoogleAccountStore::new(), GeminiConfig::new, &options, sink)
        .instrument(span)
        .await
}
