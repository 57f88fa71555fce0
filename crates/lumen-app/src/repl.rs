//! Terminal display surface.
//!
//! Reads lines of input, feeds them to the orchestrator, and prints each
//! reply in its mood color. Input and request completions are multiplexed
//! on one task, so the conversation state is only ever touched here.

use std::io::{self, Write};

use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use lumen_chat::{ConversationOrchestrator, ConversationState};

/// One line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line.
    Empty,
    /// `/voice` toggles, `/voice on|off` sets.
    Voice(Option<bool>),
    Mood,
    Help,
    Quit,
    Unknown(String),
    Message(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    if !trimmed.starts_with('/') {
        return Command::Message(trimmed.to_string());
    }

    let mut parts = trimmed.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let arg = parts.next().map(str::to_ascii_lowercase);
    match (name.as_str(), arg.as_deref()) {
        ("/voice", None) => Command::Voice(None),
        ("/voice", Some("on")) => Command::Voice(Some(true)),
        ("/voice", Some("off")) => Command::Voice(Some(false)),
        ("/mood", None) => Command::Mood,
        ("/help", None) | ("/?", None) => Command::Help,
        ("/quit", None) | ("/exit", None) => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// Render the current response for the terminal.
pub fn render_response(state: &ConversationState) -> String {
    let response = state.response();
    if state.is_error() {
        return response.red().to_string();
    }
    let color = state.mood().color();
    response.truecolor(color.r, color.g, color.b).to_string()
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "Lumen commands".bold())?;
    writeln!(out, "  /voice          toggle spoken replies")?;
    writeln!(out, "  /voice on|off   turn spoken replies on or off")?;
    writeln!(out, "  /mood           show the current mood")?;
    writeln!(out, "  /help           show this help")?;
    writeln!(out, "  /quit           leave")?;
    writeln!(out)
}

fn voice_label(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

/// Wait for a reply still in flight and print it.
async fn drain_pending<W: Write>(
    orch: &mut ConversationOrchestrator,
    out: &mut W,
) -> io::Result<()> {
    if orch.state().is_loading() && orch.settle().await {
        writeln!(out, "{}", render_response(orch.state()))?;
    }
    Ok(())
}

/// Run the interactive loop over `input` until `/quit` or end of input.
///
/// A reply still in flight when the loop ends is awaited and printed.
pub async fn run_interactive<R, W>(
    orch: &mut ConversationOrchestrator,
    input: R,
    out: &mut W,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    writeln!(
        out,
        "{} (voice {}, /help for commands)",
        "Lumen is listening.".bold(),
        voice_label(orch.state().voice_enabled())
    )?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("End of input");
                    break;
                };
                match parse_command(&line) {
                    Command::Empty => {}
                    Command::Quit => break,
                    Command::Help => print_help(out)?,
                    Command::Mood => writeln!(out, "mood: {}", orch.state().mood())?,
                    Command::Voice(setting) => {
                        let enabled = match setting {
                            Some(enabled) => {
                                orch.set_voice_enabled(enabled);
                                enabled
                            }
                            None => orch.toggle_voice(),
                        };
                        writeln!(out, "voice {}", voice_label(enabled))?;
                    }
                    Command::Unknown(command) => {
                        writeln!(out, "{} {} (try /help)", "unknown command:".yellow(), command)?;
                    }
                    Command::Message(text) => {
                        if orch.state().is_loading() {
                            writeln!(out, "{}", "(still waiting for the previous reply)".dimmed())?;
                            continue;
                        }
                        orch.set_input(text);
                        if orch.submit().is_some() {
                            writeln!(out, "{}", format!("... ({})", orch.state().mood()).dimmed())?;
                        }
                    }
                }
            }
            settled = orch.settle(), if orch.state().is_loading() => {
                if settled {
                    writeln!(out, "{}", render_response(orch.state()))?;
                }
            }
        }
    }

    drain_pending(orch, out).await
}

/// Send `text` once and print the outcome.
///
/// Returns `false` when nothing was sent or the exchange failed.
pub async fn run_once<W: Write>(
    orch: &mut ConversationOrchestrator,
    text: &str,
    out: &mut W,
) -> io::Result<bool> {
    orch.set_input(text);
    if orch.submit().is_none() {
        eprintln!("{}", "Nothing to send.".yellow());
        return Ok(false);
    }
    orch.settle().await;
    writeln!(out, "{}", render_response(orch.state()))?;
    Ok(!orch.state().is_error())
}
