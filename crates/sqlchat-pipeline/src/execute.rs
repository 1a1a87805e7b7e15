use sqlchat_db::{ConnectionConfig, Connector, DbError, QueryOutcome, SqlSession};
use sqlchat_error::Error;
use tracing::{debug, instrument, warn};

use crate::extract::SqlStatement;

/// Runs one statement on a session scoped to this call.
///
/// The connection settings are validated before the connector is touched, so a missing
/// database name is a configuration error with no connection attempt. Once a session is
/// open it is released on every path: reads are rolled back, writes are committed, failed
/// statements are rolled back, and the session is closed exactly once.
#[instrument(skip_all, fields(statement = %statement))]
pub async fn execute<C: Connector>(
    connector: &C,
    config: &ConnectionConfig,
    statement: &SqlStatement,
) -> Result<QueryOutcome, Error> {
    let params = config.validate()?;
    let mut session = connector.connect(&params).await?;

    let result = run_in_session(&mut session, statement).await;

    if let Err(e) = session.close().await {
        warn!(error = %e, "closing database session failed");
    }
    match &result {
        Ok(outcome) => debug!(read = outcome.is_read(), "statement executed"),
        Err(e) => warn!(error = %e, "statement failed"),
    }
    result.map_err(Error::from)
}

async fn run_in_session<S: SqlSession>(
    session: &mut S,
    statement: &SqlStatement,
) -> Result<QueryOutcome, DbError> {
    let raw = match session.run(statement.as_str()).await {
        Ok(raw) => raw,
        Err(e) => {
            rollback_quietly(session).await;
            return Err(e);
        }
    };

    if raw.columns.is_some() {
        let outcome = QueryOutcome::try_from(raw);
        rollback_quietly(session).await;
        outcome
    } else {
        session.commit().await?;
        QueryOutcome::try_from(raw)
    }
}

async fn rollback_quietly<S: SqlSession>(session: &mut S) {
    if let Err(e) = session.rollback().await {
        warn!(error = %e, "rollback failed");
    }
}
