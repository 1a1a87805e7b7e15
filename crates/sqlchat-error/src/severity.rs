//! Coarse-grained classification for programmatic handling of errors.
//!
//! - Error: the current request failed and should be reported
//! - Fatal: the request could not even be attempted (e.g. missing configuration)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Fatal,
}
