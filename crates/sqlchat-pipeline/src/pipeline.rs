use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use sqlchat_db::{ConnectionConfig, Connector, QueryOutcome};
use sqlchat_error::{Error, ResultExt, TracingPolicy};
use sqlchat_llm::{ChatCompletion, CompletionRequest, DEFAULT_MODEL, LlmError};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::execute::execute;
use crate::extract::{SqlStatement, extract_statement};
use crate::prompt::build_prompt;

/// Where a single request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    Generating,
    Validating,
    Executing,
    Succeeded,
    Failed,
}

impl PipelineState {
    /// Forward edges only. Any non-terminal stage may fail; nothing leaves a terminal state.
    pub fn can_advance_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Generating)
                | (Generating, Validating)
                | (Validating, Executing)
                | (Executing, Succeeded)
                | (Generating | Validating | Executing, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::Failed)
    }
}

/// Settings a [`Pipeline`] needs for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub model: String,
    pub database: ConnectionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            database: ConnectionConfig::default(),
        }
    }
}

/// Everything one call to [`Pipeline::run`] produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub request_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub question: String,
    /// Present once extraction succeeded, even if execution then failed.
    pub statement: Option<SqlStatement>,
    pub outcome: Result<QueryOutcome, Error>,
    /// States visited, starting at `Idle` and ending at the terminal state.
    pub transitions: Vec<PipelineState>,
    pub elapsed: Duration,
}

impl PipelineReport {
    pub fn state(&self) -> PipelineState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(PipelineState::Idle)
    }

    pub fn succeeded(&self) -> bool {
        self.state() == PipelineState::Succeeded
    }

    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }
}

struct StateTrail(Vec<PipelineState>);

impl StateTrail {
    fn new() -> Self {
        Self(vec![PipelineState::Idle])
    }

    fn current(&self) -> PipelineState {
        self.0.last().copied().unwrap_or(PipelineState::Idle)
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.current().can_advance_to(next),
            "illegal transition {:?} -> {next:?}",
            self.current()
        );
        tracing::debug!(from = ?self.current(), to = ?next, "pipeline transition");
        self.0.push(next);
    }
}

/// The NL-to-SQL pipeline over a completion collaborator `L` and a database connector `C`.
///
/// Holds no per-request state: every call to [`Pipeline::run`] starts from `Idle` and opens
/// its own database session.
#[derive(Debug)]
pub struct Pipeline<L, C> {
    llm: L,
    connector: C,
    config: PipelineConfig,
}

impl<L: ChatCompletion, C: Connector> Pipeline<L, C> {
    pub fn new(llm: L, connector: C, config: PipelineConfig) -> Self {
        Self {
            llm,
            connector,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Prompt, completion and extraction.
    pub async fn generate_statement(&self, question: &str) -> Result<SqlStatement, Error> {
        let completion = self.complete(question).await?;
        extract_statement(&completion)
    }

    /// Runs `statement` against the configured database on a fresh session.
    pub async fn execute(&self, statement: &SqlStatement) -> Result<QueryOutcome, Error> {
        execute(&self.connector, &self.config.database, statement).await
    }

    /// Drives one question through every stage and reports where it ended.
    #[instrument(skip_all, fields(request_id = tracing::field::Empty))]
    pub async fn run(&self, question: &str) -> PipelineReport {
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));
        let started_at = Utc::now();
        let clock = Instant::now();

        let mut trail = StateTrail::new();
        let mut statement = None;
        let outcome = self.drive(question, &mut trail, &mut statement).await;

        trail.advance(match outcome {
            Ok(_) => PipelineState::Succeeded,
            Err(_) => PipelineState::Failed,
        });
        let outcome = outcome.emit_event(&TracingPolicy);

        PipelineReport {
            request_id,
            started_at,
            question: question.to_string(),
            statement,
            outcome,
            transitions: trail.0,
            elapsed: clock.elapsed(),
        }
    }

    async fn drive(
        &self,
        question: &str,
        trail: &mut StateTrail,
        statement: &mut Option<SqlStatement>,
    ) -> Result<QueryOutcome, Error> {
        trail.advance(PipelineState::Generating);
        let completion = self.complete(question).await?;

        trail.advance(PipelineState::Validating);
        let extracted = statement.insert(extract_statement(&completion)?);

        trail.advance(PipelineState::Executing);
        self.execute(extracted).await
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn complete(&self, question: &str) -> Result<String, Error> {
        let request = CompletionRequest::single_user(&self.config.model, build_prompt(question));
        let text = self.llm.complete(&request).await?;
        if text.trim().is_empty() {
            return Err(LlmError::EmptyCompletion.into());
        }
        info!(completion = %text, "Generated SQL");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlchat_llm::Role;
    use sqlchat_test_utils::{RecordingConnector, ScriptedCompletion};

    fn config() -> PipelineConfig {
        PipelineConfig {
            model: "test-model".into(),
            database: ConnectionConfig {
                dbname: Some("shop".into()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn transitions_only_move_forward() {
        use PipelineState::*;
        assert!(Idle.can_advance_to(Generating));
        assert!(Executing.can_advance_to(Succeeded));
        assert!(Validating.can_advance_to(Failed));
        assert!(!Idle.can_advance_to(Executing));
        assert!(!Idle.can_advance_to(Failed));
        assert!(!Succeeded.can_advance_to(Generating));
        assert!(!Failed.can_advance_to(Failed));
        assert!(Succeeded.is_terminal() && Failed.is_terminal());
    }

    #[tokio::test]
    async fn sends_single_user_prompt_with_model() {
        let pipeline = Pipeline::new(
            ScriptedCompletion::replying("SELECT 1;"),
            RecordingConnector::write(0),
            config(),
        );
        let stmt = pipeline.generate_statement("how many?").await.unwrap();
        assert_eq!(stmt.as_str(), "SELECT 1;");

        let requests = pipeline.llm().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "test-model");
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[0].messages[0].role, Role::User);
        assert!(requests[0].messages[0].content.contains("User question: how many?"));
    }

    #[tokio::test]
    async fn blank_completion_is_completion_error() {
        let pipeline = Pipeline::new(
            ScriptedCompletion::replying("   \n"),
            RecordingConnector::write(0),
            config(),
        );
        let err = pipeline.generate_statement("q").await.unwrap_err();
        assert!(matches!(err, Error::Completion(_)));
    }

    #[tokio::test]
    async fn validation_failure_stops_before_executing() {
        let pipeline = Pipeline::new(
            ScriptedCompletion::replying("I cannot answer that."),
            RecordingConnector::write(0),
            config(),
        );
        let report = pipeline.run("q").await;
        assert_eq!(
            report.transitions,
            vec![
                PipelineState::Idle,
                PipelineState::Generating,
                PipelineState::Validating,
                PipelineState::Failed,
            ]
        );
        assert!(report.statement.is_none());
        assert!(matches!(report.error(), Some(Error::Validation(_))));
        assert!(pipeline.connector().events().is_empty());
    }

    #[tokio::test]
    async fn execution_failure_keeps_statement() {
        let pipeline = Pipeline::new(
            ScriptedCompletion::replying("DELETE FROM t;"),
            RecordingConnector::failing("permission denied for table t"),
            config(),
        );
        let report = pipeline.run("q").await;
        assert_eq!(report.state(), PipelineState::Failed);
        assert_eq!(report.statement.as_ref().map(SqlStatement::as_str), Some("DELETE FROM t;"));
        assert!(matches!(report.error(), Some(Error::Execution(m)) if m.contains("permission denied")));
    }

    #[tokio::test]
    async fn runs_are_independent() {
        let pipeline = Pipeline::new(
            ScriptedCompletion::replying("UPDATE t SET x = 1;").then_reply("UPDATE t SET x = 2;"),
            RecordingConnector::write(1),
            config(),
        );
        let first = pipeline.run("one").await;
        let second = pipeline.run("two").await;
        assert!(first.succeeded() && second.succeeded());
        assert_ne!(first.request_id, second.request_id);
        assert_eq!(second.transitions.first(), Some(&PipelineState::Idle));
        assert_eq!(pipeline.connector().connects(), 2);
        assert_eq!(pipeline.connector().closes(), 2);
    }
}
