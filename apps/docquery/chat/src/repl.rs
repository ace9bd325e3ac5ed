//! The interactive loop: one [`ChatSession`] fed from a line reader.

use std::io::Write;

use domain_chat::{ChatSession, QueryingClient};
use domain_completion::{CompletionMode, Role};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::render;

pub const REPL_HELP: &str = "\
/history  show the conversation so far
/help     show this help
/quit     leave (Ctrl+D works too)
anything else is sent as a question";

#[derive(Debug, PartialEq, Eq)]
pub enum ReplInput<'a> {
    Empty,
    Quit,
    Help,
    History,
    Unknown(&'a str),
    Prompt(&'a str),
}

impl<'a> ReplInput<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "" => Self::Empty,
            "/quit" | "/exit" => Self::Quit,
            "/help" => Self::Help,
            "/history" => Self::History,
            command if command.starts_with('/') => Self::Unknown(command),
            prompt => Self::Prompt(prompt),
        }
    }
}

/// Read questions from `input` until EOF or `/quit`, writing the
/// conversation to `out`. A failed turn is reported and the loop goes on.
pub async fn run<R, W>(
    client: &QueryingClient,
    session: &mut ChatSession,
    mode: CompletionMode,
    input: R,
    out: &mut W,
) -> eyre::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if let Some(greeting) = session.last_message() {
        writeln!(out, "{}", render::message(greeting))?;
    }

    let mut lines = input.lines();
    loop {
        write!(out, "{}", render::prompt_label(Role::User))?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        match ReplInput::parse(&line) {
            ReplInput::Empty => {}
            ReplInput::Quit => break,
            ReplInput::Help => writeln!(out, "{REPL_HELP}")?,
            ReplInput::History => {
                for message in session.transcript() {
                    writeln!(out, "{}", render::message(message))?;
                }
            }
            ReplInput::Unknown(command) => {
                writeln!(out, "unknown command {command}; /help lists commands")?
            }
            ReplInput::Prompt(prompt) => turn(client, session, mode, prompt, out).await?,
        }
    }

    tracing::info!(messages = session.transcript().len(), "Chat session ended");
    Ok(())
}

async fn turn<W: Write>(
    client: &QueryingClient,
    session: &mut ChatSession,
    mode: CompletionMode,
    prompt: &str,
    out: &mut W,
) -> eyre::Result<()> {
    write!(out, "{}", render::prompt_label(Role::Assistant))?;
    out.flush()?;

    let mut write_error = None;
    let result = session
        .ask(client, prompt, mode, |text| {
            if write_error.is_none() {
                if let Err(err) = write!(out, "{text}").and_then(|_| out.flush()) {
                    write_error = Some(err);
                }
            }
        })
        .await;

    if let Some(err) = write_error {
        return Err(err.into());
    }

    match result {
        Ok(_) => writeln!(out)?,
        Err(err) => writeln!(out, "\n[error] {err}")?,
    }
    Ok(())
}
