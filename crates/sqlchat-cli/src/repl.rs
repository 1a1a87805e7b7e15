use std::io::Write;

use color_eyre::eyre::Result;
use sqlchat_db::{Connector, OutputFormat};
use sqlchat_llm::ChatCompletion;
use sqlchat_pipeline::Pipeline;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

pub const EMPTY_QUESTION: &str = "Please enter a question.";
const PROMPT: &str = "sqlchat> ";
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Clear,
    Quit,
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Command::Empty,
            "/quit" | "/exit" => Command::Quit,
            "/clear" => Command::Clear,
            question => Command::Ask(question.to_string()),
        }
    }
}

/// Questions asked since start or since the last `/clear`.
#[derive(Debug, Default)]
pub struct Session {
    history: Vec<String>,
}

impl Session {
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

/// Runs one question and writes the rendered report.
pub async fn ask<L, C, W>(
    pipeline: &Pipeline<L, C>,
    question: &str,
    format: OutputFormat,
    out: &mut W,
) -> Result<()>
where
    L: ChatCompletion,
    C: Connector,
    W: Write,
{
    let report = pipeline.run(question).await;
    debug!(
        request_id = %report.request_id,
        state = ?report.state(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "request finished"
    );
    write!(out, "{}", crate::render::render_report(&report, format))?;
    out.flush()?;
    Ok(())
}

/// Reads questions line by line until `/quit` or end of input.
///
/// Pipeline errors are printed and the loop continues; only I/O failures on `input` or
/// `out` end it early.
pub async fn run_repl<L, C, R, W>(
    pipeline: &Pipeline<L, C>,
    format: OutputFormat,
    input: R,
    out: &mut W,
) -> Result<Session>
where
    L: ChatCompletion,
    C: Connector,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut session = Session::default();
    let mut lines = input.lines();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Empty => writeln!(out, "{EMPTY_QUESTION}")?,
            Command::Clear => {
                session.history.clear();
                write!(out, "{CLEAR_SCREEN}")?;
            }
            Command::Ask(question) => {
                ask(pipeline, &question, format, out).await?;
                session.history.push(question);
            }
        }
    }
    Ok(session)
}
