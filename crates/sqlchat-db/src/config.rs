use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DbError;

pub const DEFAULT_PORT: u16 = 5432;
const DEFAULT_HOST: &str = "localhost";

/// Connection descriptor as loaded from configuration. Every field is optional here; only
/// [`ConnectionConfig::validate`] decides what is required.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub dbname: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A descriptor that passed validation and can be handed to a [`crate::Connector`].
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConnectionConfig {
    /// Builds a descriptor from the `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_HOST` and
    /// `DB_PORT` variables, resolved through `lookup` so callers decide where they come from.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            host: non_empty("DB_HOST"),
            port: non_empty("DB_PORT").and_then(|p| p.trim().parse().ok()),
            dbname: non_empty("DB_NAME"),
            user: non_empty("DB_USER"),
            password: non_empty("DB_PASSWORD"),
        }
    }

    /// Fields set in `other` win over fields set in `self`.
    pub fn overlay(mut self, other: ConnectionConfig) -> Self {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.dbname.is_some() {
            self.dbname = other.dbname;
        }
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
        self
    }

    /// Checks required fields before any connection object exists. The database name is
    /// the only hard requirement; host and port fall back to `localhost:5432`.
    pub fn validate(&self) -> Result<ConnectionParams, DbError> {
        let dbname = self
            .dbname
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(DbError::MissingDatabaseName)?;
        Ok(ConnectionParams {
            host: self
                .host
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            dbname: dbname.to_string(),
            user: self.user.clone(),
            password: self.password.clone(),
        })
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
