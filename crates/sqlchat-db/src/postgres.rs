//! [`Connector`] over `tokio-postgres`.
//!
//! Statements go through the simple query protocol: every value arrives in PostgreSQL's text
//! form, and the server's row description tells reads (column metadata present) apart from
//! writes. Each session opens a transaction on connect, mirroring a driver with autocommit
//! off, and the pipeline decides whether it is committed or rolled back.

use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};
use tracing::{debug, warn};

use crate::config::ConnectionParams;
use crate::error::DbError;
use crate::session::{Connector, RawResult, SqlSession};

#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

pub struct PgSession {
    client: Option<Client>,
    driver: Option<JoinHandle<()>>,
}

impl Connector for PgConnector {
    type Session = PgSession;

    async fn connect(&self, params: &ConnectionParams) -> Result<PgSession, DbError> {
        let mut cfg = tokio_postgres::Config::new();
        cfg.host(&params.host).port(params.port).dbname(&params.dbname);
        if let Some(user) = &params.user {
            cfg.user(user);
        }
        if let Some(password) = &params.password {
            cfg.password(password);
        }

        let (client, connection) = cfg
            .connect(NoTls)
            .await
            .map_err(|e| DbError::Connect(diagnostic(&e)))?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "postgres connection task ended with error");
            }
        });
        debug!(host = %params.host, port = params.port, db = %params.dbname, "postgres session opened");

        let mut session = PgSession {
            client: Some(client),
            driver: Some(driver),
        };
        let begin = session.client()?.batch_execute("BEGIN").await;
        if let Err(e) = begin {
            let err = DbError::Connect(diagnostic(&e));
            session.close().await.ok();
            return Err(err);
        }
        Ok(session)
    }
}

impl PgSession {
    fn client(&self) -> Result<&Client, DbError> {
        self.client
            .as_ref()
            .ok_or_else(|| DbError::Close("session already closed".into()))
    }
}

impl SqlSession for PgSession {
    async fn run(&mut self, sql: &str) -> Result<RawResult, DbError> {
        let messages = self
            .client()?
            .simple_query(sql)
            .await
            .map_err(|e| DbError::Query(diagnostic(&e)))?;
        Ok(collect_messages(messages))
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        self.client()?
            .batch_execute("COMMIT")
            .await
            .map_err(|e| DbError::Commit(diagnostic(&e)))
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        self.client()?
            .batch_execute("ROLLBACK")
            .await
            .map_err(|e| DbError::Rollback(diagnostic(&e)))
    }

    async fn close(mut self) -> Result<(), DbError> {
        // Dropping the client ends the connection future, which lets the driver task finish.
        drop(self.client.take());
        if let Some(driver) = self.driver.take() {
            driver
                .await
                .map_err(|e| DbError::Close(e.to_string()))?;
        }
        debug!("postgres session closed");
        Ok(())
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        if self.client.is_some() {
            warn!("postgres session dropped without close; connection released by drop");
        }
    }
}

/// Folds the protocol messages of one simple query into a [`RawResult`].
///
/// When the text holds several statements the last described result set wins, matching a
/// cursor that reports the final statement's description.
fn collect_messages(messages: Vec<SimpleQueryMessage>) -> RawResult {
    let mut out = RawResult::default();
    for msg in messages {
        match msg {
            SimpleQueryMessage::RowDescription(desc) => {
                out.columns = Some(desc.iter().map(|c| c.name().to_string()).collect());
                out.rows.clear();
            }
            SimpleQueryMessage::Row(row) => {
                if out.columns.is_none() {
                    out.columns = Some(row.columns().iter().map(|c| c.name().to_string()).collect());
                }
                let values = (0..row.len())
                    .map(|i| row.try_get(i).ok().flatten().map(str::to_owned))
                    .collect();
                out.rows.push(values);
            }
            SimpleQueryMessage::CommandComplete(n) => out.rows_affected = Some(n),
            _ => {}
        }
    }
    out
}

/// The server's own diagnostic when there is one (`ERROR: ...` plus detail/hint), otherwise
/// the driver's message.
fn diagnostic(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => {
            let mut msg = format!("{}: {}", db.severity(), db.message());
            if let Some(detail) = db.detail() {
                msg.push_str(&format!("\nDETAIL: {detail}"));
            }
            if let Some(hint) = db.hint() {
                msg.push_str(&format!("\nHINT: {hint}"));
            }
            msg
        }
        None => err.to_string(),
    }
}
