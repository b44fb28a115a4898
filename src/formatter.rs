//! Response Formatter
//!
//! Pure mapping from (statement kind, execution outcome) to the
//! user-facing response. No I/O, no state.

use crate::models::{ExecutionResult, QueryResponse, StatementKind};
use crate::pipeline::PipelineOutcome;

pub const BLOCKED_MESSAGE: &str = "Security Alert: Please don't spam or misuse the app.";
pub const UNAVAILABLE_MESSAGE: &str = "AI service unavailable. Please try again later.";
pub const REJECTED_MESSAGE: &str =
    "Request rejected: the generated statement failed safety validation.";
pub const FAILURE_MESSAGE: &str = "Error executing query.";
pub const INSERT_MESSAGE: &str = "Expense successfully added!";

/// Map a terminal pipeline outcome to a response.
pub fn format_response(outcome: &PipelineOutcome) -> QueryResponse {
    match outcome {
        PipelineOutcome::Blocked => QueryResponse {
            sql: None,
            data: None,
            row_count: None,
            message: BLOCKED_MESSAGE.to_string(),
        },

        PipelineOutcome::Unavailable => QueryResponse {
            sql: None,
            data: None,
            row_count: None,
            message: UNAVAILABLE_MESSAGE.to_string(),
        },

        // The decline text itself is the user message; no SQL exists.
        PipelineOutcome::Declined(text) => QueryResponse {
            sql: None,
            data: None,
            row_count: None,
            message: text.clone(),
        },

        PipelineOutcome::Rejected { .. } => QueryResponse {
            sql: None,
            data: None,
            row_count: None,
            message: REJECTED_MESSAGE.to_string(),
        },

        PipelineOutcome::Failed { sql } => QueryResponse {
            sql: Some(sql.clone()),
            data: None,
            row_count: None,
            message: FAILURE_MESSAGE.to_string(),
        },

        PipelineOutcome::Completed { sql, kind, result } => {
            let (data, row_count, message) = match (kind, result) {
                (StatementKind::Insert, ExecutionResult::Affected(n)) => {
                    (None, Some(*n), INSERT_MESSAGE.to_string())
                }
                (StatementKind::Update | StatementKind::Delete, ExecutionResult::Affected(n)) => {
                    (None, Some(*n), format!("Operation successful. Affected {} records.", n))
                }
                (StatementKind::Select, ExecutionResult::Rows(rows)) => (
                    Some(rows.clone()),
                    Some(rows.len() as u64),
                    format!("Found {} records.", rows.len()),
                ),
                // Kind/result mismatch cannot be produced by the executor;
                // fall back to the generic failure shape.
                _ => (None, None, FAILURE_MESSAGE.to_string()),
            };

            QueryResponse {
                sql: Some(sql.clone()),
                data,
                row_count,
                message,
            }
        }
    }
}
