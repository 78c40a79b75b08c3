use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use moodscope_core::{
    AppConfig, LogOutcome, Session, Submission, View, format_results_readable,
    format_youtube_readable, render_results, render_youtube_state,
};
use tracing_subscriber::EnvFilter;

mod repl;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

#[derive(Parser)]
#[command(name = "moodscope")]
#[command(about = "Sentiment analysis for text, audio, video and YouTube comments")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file. Defaults to <config dir>/moodscope/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Text sentiment endpoint
    #[arg(long, global = true)]
    text_url: Option<String>,

    /// Audio sentiment endpoint
    #[arg(long, global = true)]
    audio_url: Option<String>,

    /// Video sentiment endpoint
    #[arg(long, global = true)]
    video_url: Option<String>,

    /// Local server hosting /api/analyze and /api/history
    #[arg(long, global = true)]
    local_url: Option<String>,

    /// Print records as JSON instead of cards
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a piece of text
    Text { text: String },
    /// Upload an audio file for emotion detection
    Audio { path: PathBuf },
    /// Upload a video file for sentiment analysis
    Video { path: PathBuf },
    /// Analyze the comments of a YouTube video
    Youtube { link: String },
    /// Show the analysis history stored on the local server
    History,
    /// Interactive session that keeps results across submissions
    Session,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    let endpoints = &mut config.endpoints;
    if let Some(url) = &cli.text_url {
        endpoints.text_url = url.clone();
    }
    if let Some(url) = &cli.audio_url {
        endpoints.audio_url = url.clone();
    }
    if let Some(url) = &cli.video_url {
        endpoints.video_url = url.clone();
    }
    if let Some(url) = &cli.local_url {
        endpoints.local_base_url = url.clone();
    }
    Ok(config)
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// One-line summary of a submission. Returns false when it failed.
pub(crate) fn describe(outcome: &Submission) -> (bool, String) {
    match outcome {
        Submission::Succeeded { log, .. } => {
            let mut line = format!("{} Analysis complete", style("✓").green().bold());
            if let LogOutcome::Failed(reason) = log {
                line.push_str(&format!(
                    " {}",
                    style(format!("(not saved to history: {reason})")).yellow()
                ));
            }
            (true, line)
        }
        Submission::Analyzed(analysis) => (
            true,
            format!(
                "{} Analyzed comments of {}",
                style("✓").green().bold(),
                style(&analysis.video.title).cyan()
            ),
        ),
        Submission::Rejected(err) | Submission::Failed(err) => (
            false,
            format!("{} {}", style("Error:").red().bold(), err),
        ),
        Submission::Ignored => (
            false,
            format!(
                "{} Still analyzing, wait for the current request",
                style("…").yellow()
            ),
        ),
        Submission::Cancelled => (false, format!("{} Cancelled", style("✗").dim())),
    }
}

pub(crate) fn view_output(session: &Session, view: View, json: bool) -> Result<String> {
    let state = session.snapshot();
    let output = match (view, json) {
        (View::Main, true) => serde_json::to_string_pretty(&state.results)?,
        (View::Main, false) => format_results_readable(&render_results(&state.results)),
        (View::Youtube, true) => serde_json::to_string_pretty(&serde_json::json!({
            "video": state.youtube.video,
            "sentiment": state.youtube.sentiment,
        }))?,
        (View::Youtube, false) => format_youtube_readable(&render_youtube_state(
            &state.youtube,
            session.youtube_config().fallback_comments,
        )),
    };
    Ok(output)
}

/// Stdout of a finished one-shot. With `json` it is the JSON document only.
fn report(session: &Session, view: View, json: bool) -> Result<String> {
    let body = view_output(session, view, json)?;
    if json {
        return Ok(body);
    }
    Ok(format!("{}\n{}", style("─".repeat(60)).dim(), body))
}

async fn run_once(
    session: &Session,
    message: &str,
    view: View,
    submission: impl Future<Output = Submission>,
    json: bool,
) -> Result<bool> {
    let step_start = Instant::now();
    let spinner = create_spinner(message);
    let outcome = submission.await;

    let (ok, line) = describe(&outcome);
    spinner.finish_with_message(format!(
        "{} {}",
        line,
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    ));
    if !ok {
        return Ok(false);
    }

    println!("{}", report(session, view, json)?);
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let session = Session::from_config(&config)?;
    tracing::debug!(session_id = %session.id(), "session started");

    if !cli.json {
        println!(
            "\n{}  {}\n",
            style("moodscope").cyan().bold(),
            style("Sentiment Analyzer").dim()
        );
    }

    match cli.command {
        Command::History => {
            let spinner = create_spinner("Loading history...");
            match session.load_history().await {
                Ok(count) => {
                    spinner.finish_with_message(format!(
                        "{} Loaded {} records",
                        style("✓").green().bold(),
                        count
                    ));
                    println!("{}", view_output(&session, View::Main, cli.json)?);
                }
                Err(err) => {
                    spinner.finish_with_message(format!("{} {}", style("Error:").red().bold(), err));
                    std::process::exit(1);
                }
            }
        }
        Command::Session => repl::run(session, cli.json).await?,
        Command::Text { text } => {
            session.set_text(text);
            let ok = run_once(
                &session,
                "Analyzing text...",
                View::Main,
                session.submit_text(),
                cli.json,
            )
            .await?;
            if !ok {
                std::process::exit(1);
            }
        }
        Command::Audio { path } => {
            session.select_audio(Some(path));
            let ok = run_once(
                &session,
                "Analyzing audio...",
                View::Main,
                session.submit_audio(),
                cli.json,
            )
            .await?;
            if !ok {
                std::process::exit(1);
            }
        }
        Command::Video { path } => {
            session.select_video(Some(path));
            let ok = run_once(
                &session,
                "Analyzing video...",
                View::Main,
                session.submit_video(),
                cli.json,
            )
            .await?;
            if !ok {
                std::process::exit(1);
            }
        }
        Command::Youtube { link } => {
            session.navigate(View::Youtube);
            session.set_youtube_link(link);
            let ok = run_once(
                &session,
                "Analyzing YouTube comments...",
                View::Youtube,
                session.submit_youtube(),
                cli.json,
            )
            .await?;
            if !ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
