use crate::config::ConnectionParams;
use crate::error::DbError;

/// What the database reported for one statement, before it is shaped for display.
///
/// `columns` is the column metadata: `Some` for statements that describe a result set (even
/// an empty one), `None` for statements that only complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResult {
    pub columns: Option<Vec<String>>,
    pub rows: Vec<Vec<Option<String>>>,
    pub rows_affected: Option<u64>,
}

/// Opens one session per statement.
#[allow(async_fn_in_trait, reason = "callers await in place and never spawn the future")]
pub trait Connector {
    type Session: SqlSession;

    async fn connect(&self, params: &ConnectionParams) -> Result<Self::Session, DbError>;
}

/// A single open connection with a transaction in progress.
///
/// `close` consumes the session, so a session can be closed at most once; callers are
/// expected to call exactly one of `commit`/`rollback` and then `close` on every path.
#[allow(async_fn_in_trait, reason = "callers await in place and never spawn the future")]
pub trait SqlSession {
    async fn run(&mut self, sql: &str) -> Result<RawResult, DbError>;

    async fn commit(&mut self) -> Result<(), DbError>;

    async fn rollback(&mut self) -> Result<(), DbError>;

    async fn close(self) -> Result<(), DbError>;
}
