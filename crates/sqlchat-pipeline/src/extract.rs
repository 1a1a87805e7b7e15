use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use sqlchat_error::Error;
use tracing::{debug, info};

/// `<think>…</think>` blocks emitted by reasoning models; non-greedy and newline-spanning so
/// each block is removed on its own.
static REASONING_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("reasoning pattern compiles"));

/// Statement shape: a leading verb up to the first `;`, case-insensitive, across lines.
/// Not a parser: literals, comments and chained statements are not recognized.
static STATEMENT_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(SELECT|INSERT|UPDATE|DELETE).*?;").expect("statement pattern compiles")
});

pub(crate) const NOT_A_STATEMENT: &str = "generated text is not a recognizable SQL statement";

/// A SQL statement extracted from a completion. Never empty and always ends with `;`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlStatement(String);

impl SqlStatement {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SqlStatement {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Removes every reasoning block, wherever it appears, then trims.
pub fn strip_reasoning(text: &str) -> String {
    REASONING_BLOCK.replace_all(text, "").trim().to_string()
}

/// Picks the first statement-shaped span out of a raw completion.
///
/// Later matches are discarded. Keyword case and the inner text are returned unchanged
/// apart from trimming.
pub fn extract_statement(completion: &str) -> Result<SqlStatement, Error> {
    let cleaned = strip_reasoning(completion);
    let Some(found) = STATEMENT_SHAPE.find(&cleaned) else {
        debug!(cleaned = %cleaned, "no statement-shaped span in completion");
        return Err(Error::Validation(NOT_A_STATEMENT.to_string()));
    };
    let statement = found.as_str().trim();
    info!(statement = %statement, "Extracted SQL query");
    Ok(SqlStatement(statement.to_string()))
}
