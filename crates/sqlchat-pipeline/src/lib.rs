//! Natural-language question in, executed SQL out.
//!
//! One request runs `Idle → Generating → Validating → Executing → {Succeeded, Failed}`:
//! a fixed prompt is sent to a [`ChatCompletion`](sqlchat_llm::ChatCompletion), the reply is
//! stripped of `<think>` blocks, the first statement-shaped span is extracted, and that span
//! is run on a fresh database session that is released before the request finishes.
//!
//! # Trust model
//!
//! The only check applied to generated SQL is the statement-shape match in
//! [`extract_statement`]. The extracted text is executed as-is with the configured
//! credentials: string literals, comments and `;`-chained statements inside the match are
//! not inspected. Use this with a single trusted user and a least-privileged database role;
//! it is not a boundary for multi-tenant use.

mod execute;
mod extract;
mod pipeline;
mod prompt;

pub use execute::execute;
pub use extract::{SqlStatement, extract_statement, strip_reasoning};
pub use pipeline::{Pipeline, PipelineConfig, PipelineReport, PipelineState};
pub use prompt::build_prompt;

pub use sqlchat_db::{ConnectionConfig, OutputFormat, QueryOutcome, ResultFormatter, ResultSet};
pub use sqlchat_error::{Error, Result};
