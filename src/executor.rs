//! SQL Executor
//!
//! Runs exactly one accepted statement against the SQLite store. Each
//! access opens its own connection and drops it afterward; no pooling.
//! Also hosts the schema bootstrap and the two fixed, parameter-free
//! read views, which carry no user input and bypass the pipeline.

use crate::error::TrackerError;
use crate::models::{Category, CategoryTotal, ExecutionResult, GeneratedStatement, RecentTransaction, StatementKind};
use crate::Result;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const SCHEMA_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS Finance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    purchased TEXT NOT NULL,
    categorization TEXT NOT NULL,
    amount REAL NOT NULL,
    date TEXT NOT NULL,
    payment_type TEXT
)
"#;

const ANALYTICS_SQL: &str =
    "SELECT categorization, SUM(amount) AS total FROM Finance GROUP BY categorization ORDER BY total DESC";

const RECENT_SQL: &str =
    "SELECT id, purchased, amount, categorization, date FROM Finance ORDER BY id DESC LIMIT ?1";

/// Default size of the recent-activity view.
pub const DEFAULT_RECENT_LIMIT: u32 = 5;

/// Executes accepted statements against the store.
#[derive(Clone)]
pub struct SqlExecutor {
    db_path: PathBuf,
}

impl SqlExecutor {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// One-time schema bootstrap. Idempotent.
    pub fn initialize(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(SCHEMA_DDL, [])?;
        info!(path = %self.db_path.display(), "Schema initialized");
        Ok(())
    }

    /// Execute one accepted statement, branching by kind. Writes commit
    /// atomically as a single unit (SQLite autocommit); reads return the
    /// full row set. Store-level failures are caught here and never leak
    /// raw detail past this boundary.
    pub async fn execute(&self, statement: &GeneratedStatement) -> Result<ExecutionResult> {
        let path = self.db_path.clone();
        let sql = statement.sql.clone();
        let kind = statement.kind;

        info!(kind = %kind, sql = %sql, "Executing SQL");

        let outcome = tokio::task::spawn_blocking(move || run_statement(&path, &sql, kind))
            .await
            .map_err(|e| TrackerError::ExecutionError(format!("executor task failed: {}", e)))?;

        match outcome {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("Database execution error: {}", e);
                Err(TrackerError::ExecutionError("statement execution failed".to_string()))
            }
        }
    }

    /// Category-grouped total spend, descending by total.
    pub async fn category_totals(&self) -> Result<Vec<CategoryTotal>> {
        let path = self.db_path.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<CategoryTotal>> {
            let conn = Connection::open(&path)?;
            let mut stmt = conn.prepare(ANALYTICS_SQL)?;
            let rows = stmt
                .query_map([], |row| {
                    let label: String = row.get(0)?;
                    let total: f64 = row.get(1)?;
                    Ok(CategoryTotal {
                        category: Category::from_label(&label),
                        total,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(|e| TrackerError::ExecutionError(format!("executor task failed: {}", e)))?
    }

    /// The most recent `limit` records, newest first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<RecentTransaction>> {
        let path = self.db_path.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<RecentTransaction>> {
            let conn = Connection::open(&path)?;
            let mut stmt = conn.prepare(RECENT_SQL)?;
            let rows = stmt
                .query_map([limit], |row| {
                    let label: String = row.get(3)?;
                    Ok(RecentTransaction {
                        id: row.get(0)?,
                        item: row.get(1)?,
                        amount: row.get(2)?,
                        category: Category::from_label(&label),
                        date: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(|e| TrackerError::ExecutionError(format!("executor task failed: {}", e)))?
    }
}

/// Run one statement on a fresh connection. The connection is dropped
/// unconditionally when this returns.
fn run_statement(path: &Path, sql: &str, kind: StatementKind) -> Result<ExecutionResult> {
    let conn = Connection::open(path)?;

    match kind {
        StatementKind::Select => {
            let mut stmt = conn.prepare(sql)?;
            let column_count = stmt.column_count();

            let mut rows = stmt.query([])?;
            let mut collected = Vec::new();

            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(value_to_json(row.get_ref(i)?));
                }
                collected.push(serde_json::Value::Array(values));
            }

            info!(row_count = collected.len(), "Query returned rows");
            Ok(ExecutionResult::Rows(collected))
        }
        StatementKind::Insert | StatementKind::Update | StatementKind::Delete => {
            let affected = conn.execute(sql, [])?;
            info!(affected = affected, "Modification committed");
            Ok(ExecutionResult::Affected(affected as u64))
        }
    }
}

fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(r) => serde_json::Value::from(r),
        ValueRef::Text(t) => {
            serde_json::Value::String(String::from_utf8_lossy(t).into_owned())
        }
        ValueRef::Blob(b) => serde_json::Value::String(hex::encode(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_executor() -> (tempfile::TempDir, SqlExecutor) {
        let dir = tempfile::tempdir().unwrap();
        let executor = SqlExecutor::new(dir.path().join("tracker.db"));
        executor.initialize().unwrap();
        (dir, executor)
    }

    fn insert_stmt(item: &str, category: &str, amount: f64, date: &str) -> GeneratedStatement {
        GeneratedStatement {
            sql: format!(
                "INSERT INTO Finance (purchased, categorization, amount, date, payment_type) \
                 VALUES ('{}', '{}', {}, '{}', NULL);",
                item, category, amount, date
            ),
            kind: StatementKind::Insert,
        }
    }

    #[tokio::test]
    async fn test_insert_then_select_round_trip() {
        let (_dir, executor) = scratch_executor();

        let result = executor
            .execute(&insert_stmt("pizza", "Food", 250.0, "2025-01-30"))
            .await
            .unwrap();
        assert_eq!(result, ExecutionResult::Affected(1));

        let result = executor
            .execute(&GeneratedStatement {
                sql: "SELECT purchased, amount FROM Finance;".to_string(),
                kind: StatementKind::Select,
            })
            .await
            .unwrap();

        let ExecutionResult::Rows(rows) = result else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], serde_json::json!("pizza"));
        assert_eq!(rows[0][1], serde_json::json!(250.0));
    }

    #[tokio::test]
    async fn test_last_record_delete_subquery() {
        let (_dir, executor) = scratch_executor();

        executor
            .execute(&insert_stmt("pizza", "Food", 250.0, "2025-01-30"))
            .await
            .unwrap();
        executor
            .execute(&insert_stmt("bus ticket", "Transport", 3.5, "2025-01-31"))
            .await
            .unwrap();

        let result = executor
            .execute(&GeneratedStatement {
                sql: "DELETE FROM Finance WHERE id = (SELECT id FROM Finance ORDER BY id DESC LIMIT 1);"
                    .to_string(),
                kind: StatementKind::Delete,
            })
            .await
            .unwrap();
        assert_eq!(result, ExecutionResult::Affected(1));

        let remaining = executor.recent(DEFAULT_RECENT_LIMIT).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].item, "pizza");
    }

    #[tokio::test]
    async fn test_recent_view_newest_first() {
        let (_dir, executor) = scratch_executor();

        for i in 0..7 {
            executor
                .execute(&insert_stmt(&format!("item-{}", i), "Other", 1.0, "2025-02-01"))
                .await
                .unwrap();
        }

        let recent = executor.recent(DEFAULT_RECENT_LIMIT).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].item, "item-6");
        assert_eq!(recent[4].item, "item-2");
        assert_eq!(recent[0].category, Category::Other);
    }

    #[tokio::test]
    async fn test_category_totals_descending_and_idempotent() {
        let (_dir, executor) = scratch_executor();

        executor
            .execute(&insert_stmt("pizza", "Food", 250.0, "2025-01-30"))
            .await
            .unwrap();
        executor
            .execute(&insert_stmt("salad", "Food", 50.0, "2025-01-31"))
            .await
            .unwrap();
        executor
            .execute(&insert_stmt("bus", "Transport", 20.0, "2025-01-31"))
            .await
            .unwrap();

        let first = executor.category_totals().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].category, Category::Food);
        assert_eq!(first[0].total, 300.0);
        assert_eq!(first[1].category, Category::Transport);

        // No intervening writes: identical result.
        let second = executor.category_totals().await.unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.category, b.category);
            assert_eq!(a.total, b.total);
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_typed_and_carries_no_data() {
        let (_dir, executor) = scratch_executor();

        let result = executor
            .execute(&GeneratedStatement {
                sql: "SELECT nonexistent_column FROM Finance;".to_string(),
                kind: StatementKind::Select,
            })
            .await;

        match result {
            Err(TrackerError::ExecutionError(msg)) => {
                // Raw SQLite detail stays behind the boundary.
                assert!(!msg.contains("nonexistent_column"));
            }
            other => panic!("expected ExecutionError, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_empty_views_on_fresh_store() {
        let (_dir, executor) = scratch_executor();

        assert!(executor.category_totals().await.unwrap().is_empty());
        assert!(executor.recent(DEFAULT_RECENT_LIMIT).await.unwrap().is_empty());
    }
}
