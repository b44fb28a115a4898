//! Core data models for the finance tracker

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Enums =================
//

/// Fixed expense categories. Every inserted record is normalized into
/// this set; unknown labels fold to `Other`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Food,
    Transport,
    Utilities,
    Shopping,
    Entertainment,
    Healthcare,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Utilities,
        Category::Shopping,
        Category::Entertainment,
        Category::Healthcare,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Utilities => "Utilities",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Healthcare => "Healthcare",
            Category::Other => "Other",
        }
    }

    /// Normalize a free-text label into the fixed set.
    pub fn from_label(label: &str) -> Category {
        match label.trim().to_lowercase().as_str() {
            "food" => Category::Food,
            "transport" => Category::Transport,
            "utilities" => Category::Utilities,
            "shopping" => Category::Shopping,
            "entertainment" => Category::Entertainment,
            "healthcare" => Category::Healthcare,
            _ => Category::Other,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a generated statement, inferred from the leading keyword.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementKind {
    Insert,
    Select,
    Update,
    Delete,
}

impl StatementKind {
    /// Infer the kind from the statement's leading keyword.
    /// Returns `None` for anything outside the four supported kinds.
    pub fn from_sql(sql: &str) -> Option<StatementKind> {
        let first = sql.trim().split_whitespace().next()?;
        match first.to_uppercase().as_str() {
            "INSERT" => Some(StatementKind::Insert),
            "SELECT" => Some(StatementKind::Select),
            "UPDATE" => Some(StatementKind::Update),
            "DELETE" => Some(StatementKind::Delete),
            _ => None,
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, StatementKind::Select)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatementKind::Insert => "INSERT",
            StatementKind::Select => "SELECT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        };
        write!(f, "{}", s)
    }
}

//
// ================= Request / Response =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

/// User-facing result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    pub message: String,
}

//
// ================= Statement =================
//

/// One synthesized SQL statement, produced once per request and never
/// cached or reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedStatement {
    pub sql: String,
    pub kind: StatementKind,
}

//
// ================= Execution =================
//

/// Outcome of executing one statement: result rows for a read, an
/// affected-row count for a write. Mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// Each row is a JSON array, column order preserved.
    Rows(Vec<serde_json::Value>),
    Affected(u64),
}

//
// ================= Fixed Read Views =================
//

/// One row of the category-grouped spend aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
}

/// One row of the recent-activity view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTransaction {
    pub id: i64,
    pub item: String,
    pub amount: f64,
    pub category: Category,
    pub date: String,
}
