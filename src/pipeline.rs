//! Request pipeline
//!
//! Drives one request through the five stages in strict sequence:
//!
//! Idle → Classifying → {Blocked | Synthesizing}
//!      → {Declined | Unavailable | Validating}
//!      → {Rejected | Executing}
//!      → {Failed | Formatting} → Done
//!
//! No state is re-entered and no stage retries; the first terminal
//! outcome ends the run. All security-relevant outcomes are audited.

use crate::audit::{AuditKind, AuditLog};
use crate::classifier::{Classification, InputClassifier};
use crate::executor::SqlExecutor;
use crate::formatter;
use crate::models::{ExecutionResult, QueryResponse, StatementKind};
use crate::synthesizer::{Synthesis, Synthesizer};
use crate::validator::{RejectReason, StatementValidator, Verdict};
use tracing::{info, warn};

/// Terminal outcome of one pipeline run. Mirrors the error taxonomy:
/// ClassificationBlock, GenerationUnavailable, GenerationDeclined,
/// ValidationRejected, ExecutionFailure, Success.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Blocked,
    Unavailable,
    Declined(String),
    Rejected {
        sql: String,
        reason: RejectReason,
    },
    Failed {
        sql: String,
    },
    Completed {
        sql: String,
        kind: StatementKind,
        result: ExecutionResult,
    },
}

/// One pipeline instance serves all requests; each `handle` call is
/// independent and shares nothing but the store and the audit log.
pub struct Pipeline {
    synthesizer: Box<dyn Synthesizer>,
    executor: SqlExecutor,
    audit: AuditLog,
}

impl Pipeline {
    pub fn new(synthesizer: Box<dyn Synthesizer>, executor: SqlExecutor, audit: AuditLog) -> Self {
        Self {
            synthesizer,
            executor,
            audit,
        }
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Run one question end-to-end and shape the response.
    pub async fn handle(&self, question: &str) -> QueryResponse {
        let outcome = self.run(question).await;
        formatter::format_response(&outcome)
    }

    /// Run one question through the stages, yielding the terminal
    /// outcome. The HTTP layer uses this to pick a status code before
    /// formatting.
    pub async fn run(&self, question: &str) -> PipelineOutcome {
        info!("Received query: {}", question);

        // 1. Classify. Blocked input makes no downstream calls.
        if InputClassifier::classify(question) == Classification::Blocked {
            warn!("Query blocked by input classifier");
            self.audit
                .record(AuditKind::BlockedInput, question, None)
                .await;
            return PipelineOutcome::Blocked;
        }

        // 2. Synthesize.
        let statement = match self.synthesizer.synthesize(question).await {
            Ok(Synthesis::Statement(statement)) => statement,
            Ok(Synthesis::Declined(text)) => {
                return PipelineOutcome::Declined(text);
            }
            Ok(Synthesis::Unavailable) => {
                return PipelineOutcome::Unavailable;
            }
            Err(e) => {
                warn!("Synthesis failed: {}", e);
                return PipelineOutcome::Unavailable;
            }
        };

        // 3. Validate. Rejection is distinct from a model decline.
        let kind = match StatementValidator::validate(&statement.sql, question) {
            Verdict::Accepted(kind) => kind,
            Verdict::Rejected(reason) => {
                warn!(reason = %reason, "Statement rejected by safety gate");
                self.audit
                    .record(
                        AuditKind::RejectedStatement,
                        &statement.sql,
                        Some(reason.to_string()),
                    )
                    .await;
                return PipelineOutcome::Rejected {
                    sql: statement.sql,
                    reason,
                };
            }
        };

        // 4. Execute exactly one statement.
        match self.executor.execute(&statement).await {
            Ok(result) => {
                let detail = match &result {
                    ExecutionResult::Rows(rows) => format!("{} rows", rows.len()),
                    ExecutionResult::Affected(n) => format!("{} affected", n),
                };
                self.audit
                    .record(AuditKind::ExecutedStatement, &statement.sql, Some(detail))
                    .await;

                info!(kind = %kind, "Request processed");
                PipelineOutcome::Completed {
                    sql: statement.sql,
                    kind,
                    result,
                }
            }
            Err(e) => {
                warn!("Execution failed: {}", e);
                self.audit
                    .record(AuditKind::StoreFailure, &statement.sql, Some(e.to_string()))
                    .await;
                PipelineOutcome::Failed { sql: statement.sql }
            }
        }
    }
}
