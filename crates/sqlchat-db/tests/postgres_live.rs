//! Runs statements against a real PostgreSQL. Requires `--features live_api_tests` and the
//! `DB_*` variables (or a `.env` file) pointing at a scratch database.
#![cfg(feature = "live_api_tests")]

use sqlchat_db::{ConnectionConfig, Connector, PgConnector, SqlSession};

fn params() -> sqlchat_db::ConnectionParams {
    let _ = dotenvy::dotenv();
    ConnectionConfig::from_vars(|k| std::env::var(k).ok())
        .validate()
        .expect("DB_NAME must be set for live tests")
}

#[tokio::test]
#[ignore = "needs a running PostgreSQL"]
async fn select_reports_columns_even_without_rows() {
    let mut session = PgConnector.connect(&params()).await.unwrap();
    let raw = session
        .run("SELECT 1 AS one, NULL::text AS nothing WHERE false;")
        .await
        .unwrap();
    session.rollback().await.unwrap();
    session.close().await.unwrap();

    assert_eq!(
        raw.columns,
        Some(vec!["one".to_string(), "nothing".to_string()])
    );
    assert!(raw.rows.is_empty());
}

#[tokio::test]
#[ignore = "needs a running PostgreSQL"]
async fn write_has_no_column_metadata() {
    let mut session = PgConnector.connect(&params()).await.unwrap();
    let raw = session
        .run("CREATE TEMP TABLE sqlchat_live(msg text);")
        .await
        .unwrap();
    session.rollback().await.unwrap();
    session.close().await.unwrap();
    assert_eq!(raw.columns, None);
}

#[tokio::test]
#[ignore = "needs a running PostgreSQL"]
async fn errors_carry_server_diagnostic() {
    let mut session = PgConnector.connect(&params()).await.unwrap();
    let err = session
        .run("SELECT * FROM sqlchat_table_that_does_not_exist;")
        .await
        .unwrap_err();
    session.rollback().await.unwrap();
    session.close().await.unwrap();
    assert!(err.to_string().contains("does not exist"), "{err}");
}
