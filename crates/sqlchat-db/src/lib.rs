//! Relational-database side of sqlchat: connection settings, the scoped session seam, the
//! PostgreSQL implementation of it, and result shaping for display.

mod config;
mod error;
pub mod postgres;
mod result;
mod session;

pub use config::{ConnectionConfig, ConnectionParams, DEFAULT_PORT};
pub use error::DbError;
pub use postgres::{PgConnector, PgSession};
pub use result::{OutputFormat, QueryOutcome, ResultFormatter, ResultSet, WRITE_SUCCESS_STATUS};
pub use session::{Connector, RawResult, SqlSession};
