//! Shared fakes and setup for tests across the workspace.
//!
//! - [`ScriptedCompletion`] stands in for the chat endpoint and records every prompt.
//! - [`RecordingConnector`] stands in for the database and records every session call, so
//!   tests can assert that connections are opened and closed in balance.

mod fake_db;
mod fake_llm;
mod tracing_setup;

pub use fake_db::{DbEvent, RecordingConnector, RecordingSession, ScriptedStatement};
pub use fake_llm::ScriptedCompletion;
pub use tracing_setup::init_test_tracing;

use std::path::PathBuf;

/// Workspace root, resolved from this crate's manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // crates/test-utils -> crates -> workspace root
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or(manifest_dir)
}
