pub mod policy;
pub mod result_ext;
pub mod severity;

// public exports
pub use policy::ErrorPolicy;
#[cfg(feature = "tracing")]
pub use policy::TracingPolicy;
pub use result_ext::ResultExt;
pub use severity::Severity;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way a single question can fail on its way to a result.
///
/// Variants carry the already-rendered diagnostic of the collaborator that failed, so the
/// error can be cloned into reports and shown to the user without holding on to driver or
/// HTTP client types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A required setting is absent; nothing was attempted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The text-generation call failed or returned nothing usable.
    #[error("Error generating SQL: {0}")]
    Completion(String),

    /// The completion did not contain a recognizable statement.
    #[error("Invalid SQL: {0}")]
    Validation(String),

    /// The database rejected the statement or could not be reached.
    #[error("Database error: {0}")]
    Execution(String),
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Error::Configuration(_) => Severity::Fatal,
            Error::Completion(_) | Error::Validation(_) | Error::Execution(_) => Severity::Error,
        }
    }

    /// Short label for the stage that produced the error, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::Completion(_) => "completion",
            Error::Validation(_) => "validation",
            Error::Execution(_) => "execution",
        }
    }
}
