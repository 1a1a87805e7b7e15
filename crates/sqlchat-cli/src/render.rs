use sqlchat_db::{OutputFormat, ResultFormatter};
use sqlchat_pipeline::PipelineReport;

/// Terminal text for one finished request: the statement in a fenced block when one was
/// extracted, then the result or a single error line.
pub fn render_report(report: &PipelineReport, format: OutputFormat) -> String {
    let mut out = String::new();
    if let Some(statement) = &report.statement {
        out.push_str("```sql\n");
        out.push_str(statement.as_str());
        out.push_str("\n```\n");
    }
    match &report.outcome {
        Ok(outcome) => out.push_str(&ResultFormatter::render(outcome, format)),
        Err(e) => out.push_str(&single_line(&e.to_string())),
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Driver diagnostics can span lines (DETAIL, HINT); the user sees them joined.
fn single_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
