use super::{ErrorPolicy, Result};

/// Hands a failed `Result` to an [`ErrorPolicy`] and passes it on unchanged, so reporting
/// stays out of the control flow.
pub trait ResultExt<T> {
    fn emit_event(self, policy: &impl ErrorPolicy) -> Self;
}

impl<T> ResultExt<T> for Result<T> {
    fn emit_event(self, policy: &impl ErrorPolicy) -> Self {
        if let Err(ref e) = self {
            policy.emit(e);
        }
        self
    }
}
