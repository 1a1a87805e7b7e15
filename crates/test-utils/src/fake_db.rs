use std::sync::{Arc, Mutex};

use sqlchat_db::{ConnectionParams, Connector, DbError, RawResult, SqlSession};

/// Every call a [`RecordingSession`] or [`RecordingConnector`] received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbEvent {
    Connect { dbname: String },
    Run(String),
    Commit,
    Rollback,
    Close,
}

/// How the fake database answers the statement it is given.
#[derive(Debug, Clone)]
pub enum ScriptedStatement {
    /// A read: column metadata plus rows.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Option<String>>>,
    },
    /// A write: no column metadata.
    Write { rows_affected: u64 },
    /// The driver rejects the statement with this diagnostic.
    Fail(String),
}

/// A [`Connector`] that hands out recording sessions and keeps a shared event log.
#[derive(Debug, Clone)]
pub struct RecordingConnector {
    events: Arc<Mutex<Vec<DbEvent>>>,
    answer: ScriptedStatement,
    fail_connect: Option<String>,
    fail_commit: Option<String>,
}

impl RecordingConnector {
    pub fn answering(answer: ScriptedStatement) -> Self {
        Self {
            events: Arc::default(),
            answer,
            fail_connect: None,
            fail_commit: None,
        }
    }

    pub fn rows(columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> Self {
        Self::answering(ScriptedStatement::Rows {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(|v| v.map(str::to_owned)).collect())
                .collect(),
        })
    }

    pub fn write(rows_affected: u64) -> Self {
        Self::answering(ScriptedStatement::Write { rows_affected })
    }

    pub fn failing(diagnostic: impl Into<String>) -> Self {
        Self::answering(ScriptedStatement::Fail(diagnostic.into()))
    }

    pub fn with_connect_failure(mut self, diagnostic: impl Into<String>) -> Self {
        self.fail_connect = Some(diagnostic.into());
        self
    }

    pub fn with_commit_failure(mut self, diagnostic: impl Into<String>) -> Self {
        self.fail_commit = Some(diagnostic.into());
        self
    }

    pub fn events(&self) -> Vec<DbEvent> {
        self.events.lock().expect("event log poisoned").clone()
    }

    pub fn count(&self, wanted: &DbEvent) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }

    pub fn connects(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, DbEvent::Connect { .. }))
            .count()
    }

    pub fn closes(&self) -> usize {
        self.count(&DbEvent::Close)
    }

    fn record(&self, event: DbEvent) {
        self.events.lock().expect("event log poisoned").push(event);
    }
}

impl Connector for RecordingConnector {
    type Session = RecordingSession;

    async fn connect(&self, params: &ConnectionParams) -> Result<RecordingSession, DbError> {
        if let Some(diag) = &self.fail_connect {
            return Err(DbError::Connect(diag.clone()));
        }
        self.record(DbEvent::Connect {
            dbname: params.dbname.clone(),
        });
        Ok(RecordingSession {
            owner: self.clone(),
        })
    }
}

/// Session handed out by [`RecordingConnector`].
#[derive(Debug)]
pub struct RecordingSession {
    owner: RecordingConnector,
}

impl SqlSession for RecordingSession {
    async fn run(&mut self, sql: &str) -> Result<RawResult, DbError> {
        self.owner.record(DbEvent::Run(sql.to_string()));
        match &self.owner.answer {
            ScriptedStatement::Rows { columns, rows } => Ok(RawResult {
                columns: Some(columns.clone()),
                rows: rows.clone(),
                rows_affected: Some(rows.len() as u64),
            }),
            ScriptedStatement::Write { rows_affected } => Ok(RawResult {
                columns: None,
                rows: Vec::new(),
                rows_affected: Some(*rows_affected),
            }),
            ScriptedStatement::Fail(diag) => Err(DbError::Query(diag.clone())),
        }
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        self.owner.record(DbEvent::Commit);
        match &self.owner.fail_commit {
            Some(diag) => Err(DbError::Commit(diag.clone())),
            None => Ok(()),
        }
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        self.owner.record(DbEvent::Rollback);
        Ok(())
    }

    async fn close(self) -> Result<(), DbError> {
        self.owner.record(DbEvent::Close);
        Ok(())
    }
}
