use anyhow::Context;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use delay_check::batch;
use delay_check::channels::CliChannel;
use delay_check::config::{CheckConfig, OutputFormat};
use delay_check::engine::cases::render_cases;
use delay_check::report::Report;

const USAGE: &str = "\
Usage: delay-check [part-b|part-d]

Environment:
  DELAY_CHECK_TOOL      part-b or part-d (the argument takes precedence)
  DELAY_CHECK_FORMAT    text (default) or json
  DELAY_CHECK_PROFILE   evaluate a saved profile document instead of asking
  DELAY_CHECK_CASES     1 to print the built-in reference cases
  RUST_LOG              log filter (default: warn)";

fn print_report(report: &Report, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => println!("{}", report.to_markdown()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with the wizard on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let arg = std::env::args().nth(1);
    if matches!(arg.as_deref(), Some("-h" | "--help")) {
        println!("{USAGE}");
        return Ok(());
    }

    let config = CheckConfig::from_env()?.with_tool_arg(arg.as_deref())?;

    if config.print_cases {
        println!("{}", render_cases());
        return Ok(());
    }

    // ── Batch mode ───────────────────────────────────────────────────────
    if let Some(path) = &config.profile_path {
        let report = batch::evaluate_file(path)
            .await
            .with_context(|| format!("evaluating {}", path.display()))?;
        return print_report(&report, config.format);
    }

    // ── Interactive mode ─────────────────────────────────────────────────
    let mut channel = CliChannel::stdio(config.format);
    let tool = match config.tool {
        Some(tool) => tool,
        None => match channel.choose_tool().await? {
            Some(tool) => tool,
            None => return Ok(()),
        },
    };

    let session_id = Uuid::new_v4();
    let mut wizard = tool.new_wizard();
    let end = channel
        .run_session(wizard.as_mut())
        .instrument(info_span!("session", id = %session_id, tool = %tool))
        .await?;
    info!(session = %session_id, ?end, "Session ended");

    Ok(())
}
