//! Formats query outcomes for different output types

use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{QueryOutcome, ResultSet};

const NULL_TEXT: &str = "NULL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!(
                "unknown output format '{other}', expected table, json or markdown"
            )),
        }
    }
}

/// Formats query outcomes for different use cases
pub struct ResultFormatter;

impl ResultFormatter {
    pub fn render(outcome: &QueryOutcome, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::plain_text(outcome),
            OutputFormat::Json => Self::json(outcome),
            OutputFormat::Markdown => Self::markdown(outcome),
        }
    }

    /// Format as an aligned plain-text table with a row count footer
    pub fn plain_text(outcome: &QueryOutcome) -> String {
        let set = match outcome {
            QueryOutcome::Rows(set) => set,
            written => return Self::status_line(written),
        };

        let cells = Self::cells(set);
        let widths: Vec<usize> = set
            .columns()
            .iter()
            .enumerate()
            .map(|(i, col)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(col.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let pad = |text: &str, width: usize| {
            let fill = width.saturating_sub(text.chars().count());
            format!("{text}{}", " ".repeat(fill))
        };

        let mut out = String::new();
        out.push_str(
            set.columns()
                .iter()
                .zip(&widths)
                .map(|(c, w)| pad(c, *w))
                .join(" | ")
                .trim_end(),
        );
        out.push('\n');
        out.push_str(&widths.iter().map(|w| "-".repeat(*w)).join("-+-"));
        out.push('\n');
        for row in &cells {
            out.push_str(
                row.iter()
                    .zip(&widths)
                    .map(|(c, w)| pad(c, *w))
                    .join(" | ")
                    .trim_end(),
            );
            out.push('\n');
        }
        let n = set.rows().len();
        out.push_str(&format!("({n} {})", if n == 1 { "row" } else { "rows" }));
        out
    }

    /// Format as JSON: an array of `{column: value}` records, or a status object
    pub fn json(outcome: &QueryOutcome) -> String {
        let value = match outcome {
            QueryOutcome::Rows(set) => json!(set.records()),
            QueryOutcome::Written {
                status,
                rows_affected,
            } => json!({ "status": status, "rows_affected": rows_affected }),
        };
        serde_json::to_string_pretty(&value).unwrap_or_default()
    }

    /// Format as a Markdown table
    pub fn markdown(outcome: &QueryOutcome) -> String {
        let set = match outcome {
            QueryOutcome::Rows(set) => set,
            written => return Self::status_line(written),
        };
        let escape = |s: &str| s.replace('|', "\\|");
        let mut out = format!(
            "| {} |\n| {} |\n",
            set.columns().iter().map(|c| escape(c)).join(" | "),
            set.columns().iter().map(|_| "---").join(" | ")
        );
        for row in Self::cells(set) {
            out.push_str(&format!("| {} |\n", row.iter().map(|c| escape(c)).join(" | ")));
        }
        out
    }

    fn status_line(outcome: &QueryOutcome) -> String {
        match outcome {
            QueryOutcome::Written {
                status,
                rows_affected: Some(n),
            } => format!("{status} ({n} rows affected)"),
            QueryOutcome::Written { status, .. } => status.clone(),
            QueryOutcome::Rows(_) => String::new(),
        }
    }

    fn cells(set: &ResultSet) -> Vec<Vec<String>> {
        set.rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| v.as_deref().unwrap_or(NULL_TEXT).to_string())
                    .collect()
            })
            .collect()
    }
}
