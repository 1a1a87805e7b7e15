//! How errors leave the pipeline.
//!
//! Library crates do not print; they return [`crate::Result`] and hand failures to an
//! `ErrorPolicy` at the boundary, which decides how they are surfaced.

use super::{Error, Severity};

pub trait ErrorPolicy: Send + Sync {
    /// Classify the error's severity
    fn classify(&self, error: &Error) -> Severity;

    /// Emit the error according to the policy
    fn emit(&self, error: &Error);
}

/// Logs through `tracing` at `ERROR`, tagging each event with the failing stage.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Default)]
pub struct TracingPolicy;

#[cfg(feature = "tracing")]
impl ErrorPolicy for TracingPolicy {
    fn classify(&self, error: &Error) -> Severity {
        error.severity()
    }

    fn emit(&self, error: &Error) {
        let fatal = self.classify(error) == Severity::Fatal;
        tracing::error!(kind = error.kind(), fatal, error = %error, "request failed");
    }
}

#[cfg(all(test, feature = "tracing"))]
mod tests {
    use super::*;

    #[test]
    fn tracing_policy_uses_error_severity() {
        let policy = TracingPolicy;
        assert_eq!(
            policy.classify(&Error::Configuration("DB_NAME environment variable is missing.".into())),
            Severity::Fatal
        );
        assert_eq!(
            policy.classify(&Error::Execution("syntax error at or near \"SELEC\"".into())),
            Severity::Error
        );
        policy.emit(&Error::Validation("nothing matched".into()));
    }
}
