mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DbError;
use crate::session::RawResult;

/// Status reported for statements that return no column metadata.
pub const WRITE_SUCCESS_STATUS: &str = "Query executed successfully.";

/// A fully materialized read result. Every row has exactly one value per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self, DbError> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err(DbError::MalformedResult(format!(
                "row {idx} has {} values for {} columns",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as `{column: value}` objects, in column order. NULL becomes JSON `null`.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|v| match v {
                        Some(s) => Value::String(s.clone()),
                        None => Value::Null,
                    }))
                    .collect()
            })
            .collect()
    }
}

/// What one executed statement produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// The statement described a result set.
    Rows(ResultSet),
    /// The statement completed without column metadata and was committed.
    Written {
        status: String,
        rows_affected: Option<u64>,
    },
}

impl QueryOutcome {
    pub fn written(rows_affected: Option<u64>) -> Self {
        QueryOutcome::Written {
            status: WRITE_SUCCESS_STATUS.to_string(),
            rows_affected,
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, QueryOutcome::Rows(_))
    }
}

impl TryFrom<RawResult> for QueryOutcome {
    type Error = DbError;

    fn try_from(raw: RawResult) -> Result<Self, Self::Error> {
        match raw.columns {
            Some(columns) => Ok(QueryOutcome::Rows(ResultSet::new(columns, raw.rows)?)),
            None => Ok(QueryOutcome::written(raw.rows_affected)),
        }
    }
}
