use std::path::PathBuf;

use anyhow::Result;
use console::style;
use moodscope_core::{InputKind, Session, Submission, View};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use crate::{describe, view_output};

const HELP: &str = "\
Commands:
  text <TEXT>        analyze a piece of text
  audio <PATH>       upload an audio file
  video <PATH>       upload a video file
  youtube <LINK>     analyze comments of a YouTube video
  results            show the current view
  view main|youtube  switch view (cancels requests of the view left)
  help               show this message
  quit               leave the session";

#[derive(Debug, PartialEq)]
enum ReplCommand {
    Submit(InputKind, String),
    Results,
    View(View),
    Help,
    Quit,
}

fn parse_command(line: &str) -> std::result::Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim().to_string();

    let command = match word {
        "text" => ReplCommand::Submit(InputKind::Text, rest),
        "audio" => ReplCommand::Submit(InputKind::Audio, rest),
        "video" => ReplCommand::Submit(InputKind::Video, rest),
        "youtube" | "yt" => ReplCommand::Submit(InputKind::Youtube, rest),
        "results" | "ls" => ReplCommand::Results,
        "view" => match rest.as_str() {
            "main" => ReplCommand::View(View::Main),
            "youtube" => ReplCommand::View(View::Youtube),
            other => return Err(format!("unknown view '{other}' (main|youtube)")),
        },
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

/// Stores the input on the session and starts the submission in the background.
fn submit(session: &Session, kind: InputKind, arg: String, done: mpsc::Sender<Submission>) {
    let target = match kind {
        InputKind::Youtube => View::Youtube,
        _ => View::Main,
    };
    if session.snapshot().view != target {
        session.navigate(target);
    }

    match kind {
        InputKind::Text => session.set_text(arg),
        InputKind::Audio => session.select_audio(file_arg(arg)),
        InputKind::Video => session.select_video(file_arg(arg)),
        InputKind::Youtube => session.set_youtube_link(arg),
    }

    let session = session.clone();
    tokio::spawn(async move {
        let outcome = match kind {
            InputKind::Text => session.submit_text().await,
            InputKind::Audio => session.submit_audio().await,
            InputKind::Video => session.submit_video().await,
            InputKind::Youtube => session.submit_youtube().await,
        };
        let _ = done.send(outcome).await;
    });
}

fn file_arg(arg: String) -> Option<PathBuf> {
    (!arg.is_empty()).then(|| PathBuf::from(arg))
}

fn print_current(session: &Session, json: bool) -> Result<()> {
    println!("{}", view_output(session, session.snapshot().view, json)?);
    Ok(())
}

fn prompt(session: &Session) {
    let view = match session.snapshot().view {
        View::Main => "main",
        View::Youtube => "youtube",
    };
    eprint!("{} ", style(format!("moodscope[{view}]>")).cyan());
}

pub async fn run(session: Session, json: bool) -> Result<()> {
    match session.load_history().await {
        Ok(count) => println!(
            "{} Loaded {} records from history",
            style("✓").green().bold(),
            count
        ),
        Err(err) => println!("{} {}", style("Error:").red().bold(), err),
    }
    println!("{}\n", style("Type 'help' for commands").dim());

    let (done_tx, mut done_rx) = mpsc::channel::<Submission>(8);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt(&session);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(ReplCommand::Quit)) => break,
                    Ok(Some(ReplCommand::Help)) => println!("{HELP}"),
                    Ok(Some(ReplCommand::Results)) => print_current(&session, json)?,
                    Ok(Some(ReplCommand::View(view))) => {
                        session.navigate(view);
                        print_current(&session, json)?;
                    }
                    Ok(Some(ReplCommand::Submit(kind, arg))) => {
                        if session.is_loading() {
                            println!("{}", describe(&Submission::Ignored).1);
                        } else {
                            println!("{} {} analysis started", style("→").dim(), kind.label());
                            submit(&session, kind, arg, done_tx.clone());
                        }
                    }
                    Err(message) => println!("{} {}", style("?").yellow(), message),
                }
                prompt(&session);
            }
            Some(outcome) = done_rx.recv() => {
                let (ok, line) = describe(&outcome);
                println!("\n{line}");
                if ok {
                    print_current(&session, json)?;
                }
                prompt(&session);
            }
        }
    }

    tracing::debug!(session_id = %session.id(), "session closed");
    Ok(())
}
