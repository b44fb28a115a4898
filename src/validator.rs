//! Output Validator (safety gate)
//!
//! Rules-based validation of synthesized SQL before execution.
//! Deterministic enforcement, pure over text. This gate is distinct from
//! the synthesizer's decline path: it judges statement structure, never
//! the model's intent.

use crate::models::StatementKind;
use std::fmt;
use tracing::warn;

/// Verdict on one synthesized statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted(StatementKind),
    Rejected(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// DROP, TRUNCATE, ALTER or GRANT anywhere in the statement.
    DestructiveKeyword(String),
    /// UPDATE/DELETE without WHERE and without explicit bulk intent.
    MissingWhereClause,
    /// Identifier outside the fixed table/column set.
    UnknownIdentifier(String),
    /// Leading keyword is not INSERT/SELECT/UPDATE/DELETE.
    UnsupportedStatement,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::DestructiveKeyword(kw) => {
                write!(f, "destructive keyword {}", kw)
            }
            RejectReason::MissingWhereClause => {
                write!(f, "mutation without WHERE clause or explicit bulk intent")
            }
            RejectReason::UnknownIdentifier(ident) => {
                write!(f, "identifier outside the fixed schema: {}", ident)
            }
            RejectReason::UnsupportedStatement => {
                write!(f, "statement kind not supported")
            }
        }
    }
}

const DESTRUCTIVE_KEYWORDS: &[&str] = &["DROP", "TRUNCATE", "ALTER", "GRANT"];

/// The single entity and its columns. Nothing else may be referenced.
const SCHEMA_IDENTIFIERS: &[&str] = &[
    "finance",
    "id",
    "purchased",
    "categorization",
    "amount",
    "date",
    "payment_type",
];

/// SQL keywords and functions a generated statement may legitimately use.
const SQL_KEYWORDS: &[&str] = &[
    "select", "insert", "into", "values", "update", "set", "delete", "from",
    "where", "and", "or", "not", "null", "is", "in", "like", "between",
    "order", "by", "asc", "desc", "limit", "offset", "group", "having",
    "distinct", "as", "exists", "count", "sum", "avg", "min", "max",
    "date", "datetime", "strftime", "current_date",
];

/// Explicit user intent to affect all records, exempting the WHERE-clause
/// requirement. Matched against the question, never the SQL, so the model
/// cannot self-authorize a bulk mutation.
const BULK_SENTINELS: &[&str] = &[
    "delete all",
    "remove all",
    "all records",
    "all transactions",
    "everything",
];

/// Statement validator
pub struct StatementValidator;

impl StatementValidator {
    /// Validate one synthesized statement against the original question.
    /// All rules are enforced before any execution.
    pub fn validate(sql: &str, question: &str) -> Verdict {
        let scrubbed = strip_string_literals(sql);
        let tokens: Vec<String> = tokenize(&scrubbed);

        // Rule 1: destructive schema keywords are rejected unconditionally.
        for token in &tokens {
            let upper = token.to_uppercase();
            if DESTRUCTIVE_KEYWORDS.contains(&upper.as_str()) {
                warn!(keyword = %upper, "Statement rejected: destructive keyword");
                return Verdict::Rejected(RejectReason::DestructiveKeyword(upper));
            }
        }

        // Rule 2: only the four supported statement kinds may execute.
        let Some(kind) = StatementKind::from_sql(sql) else {
            warn!("Statement rejected: unsupported leading keyword");
            return Verdict::Rejected(RejectReason::UnsupportedStatement);
        };

        // Rule 3: UPDATE/DELETE must carry WHERE unless the user explicitly
        // asked for a bulk action.
        if matches!(kind, StatementKind::Update | StatementKind::Delete) {
            let has_where = tokens.iter().any(|t| t.eq_ignore_ascii_case("where"));
            if !has_where && !has_bulk_intent(question) {
                warn!("Statement rejected: mutation without WHERE clause");
                return Verdict::Rejected(RejectReason::MissingWhereClause);
            }
        }

        // Rule 4: every identifier must belong to the fixed schema or the
        // SQL keyword allowlist.
        for token in &tokens {
            let lowered = token.to_lowercase();
            if !SQL_KEYWORDS.contains(&lowered.as_str())
                && !SCHEMA_IDENTIFIERS.contains(&lowered.as_str())
            {
                warn!(identifier = %token, "Statement rejected: unknown identifier");
                return Verdict::Rejected(RejectReason::UnknownIdentifier(token.clone()));
            }
        }

        Verdict::Accepted(kind)
    }
}

/// Replace single-quoted string literals with spaces so their contents
/// are never scanned as identifiers. Handles the '' escape.
fn strip_string_literals(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut in_literal = false;

    while let Some(c) = chars.next() {
        if in_literal {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                } else {
                    in_literal = false;
                }
            }
            out.push(' ');
        } else if c == '\'' {
            in_literal = true;
            out.push(' ');
        } else {
            out.push(c);
        }
    }

    out
}

/// Extract identifier-shaped tokens. Numbers and punctuation are skipped;
/// double quotes act as separators so quoted identifiers still tokenize.
fn tokenize(scrubbed: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in scrubbed.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    // Purely numeric tokens are literals, not identifiers.
    tokens.retain(|t| !t.chars().all(|c| c.is_ascii_digit()));
    tokens
}

fn has_bulk_intent(question: &str) -> bool {
    let lowered = question.to_lowercase();
    BULK_SENTINELS.iter().any(|s| lowered.contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destructive_keywords_always_rejected() {
        let cases = vec![
            "DROP TABLE Finance;",
            "drop table Finance",
            "TRUNCATE TABLE Finance;",
            "ALTER TABLE Finance ADD COLUMN notes TEXT;",
            "GRANT ALL ON Finance TO public;",
            "SELECT * FROM Finance; DROP TABLE Finance;",
        ];

        for sql in cases {
            assert!(
                matches!(
                    StatementValidator::validate(sql, "whatever"),
                    Verdict::Rejected(RejectReason::DestructiveKeyword(_))
                ),
                "{}",
                sql
            );
        }
    }

    #[test]
    fn test_destructive_word_inside_literal_is_ignored() {
        let sql = "INSERT INTO Finance (purchased, categorization, amount, date, payment_type) \
                   VALUES ('drop cloth', 'Shopping', 12, '2025-06-01', NULL);";
        assert_eq!(
            StatementValidator::validate(sql, "I bought a drop cloth for 12"),
            Verdict::Accepted(StatementKind::Insert)
        );
    }

    #[test]
    fn test_mutation_without_where_rejected() {
        assert_eq!(
            StatementValidator::validate("DELETE FROM Finance;", "delete my last purchase"),
            Verdict::Rejected(RejectReason::MissingWhereClause)
        );
        assert_eq!(
            StatementValidator::validate("UPDATE Finance SET amount = 0;", "fix the amount"),
            Verdict::Rejected(RejectReason::MissingWhereClause)
        );
    }

    #[test]
    fn test_bulk_sentinel_exempts_where_rule() {
        assert_eq!(
            StatementValidator::validate("DELETE FROM Finance;", "please delete all my expenses"),
            Verdict::Accepted(StatementKind::Delete)
        );
        assert_eq!(
            StatementValidator::validate("DELETE FROM Finance;", "wipe everything"),
            Verdict::Accepted(StatementKind::Delete)
        );
    }

    #[test]
    fn test_unknown_table_rejected() {
        assert!(matches!(
            StatementValidator::validate("SELECT * FROM users;", "show users"),
            Verdict::Rejected(RejectReason::UnknownIdentifier(_))
        ));
    }

    #[test]
    fn test_unknown_column_rejected() {
        assert!(matches!(
            StatementValidator::validate(
                "SELECT password FROM Finance;",
                "show my passwords"
            ),
            Verdict::Rejected(RejectReason::UnknownIdentifier(_))
        ));
    }

    #[test]
    fn test_unsupported_statement_rejected() {
        assert_eq!(
            StatementValidator::validate("PRAGMA table_info(Finance);", "inspect schema"),
            Verdict::Rejected(RejectReason::UnsupportedStatement)
        );
    }

    #[test]
    fn test_contract_examples_accepted() {
        let cases = vec![
            (
                "INSERT INTO Finance (purchased, categorization, amount, date, payment_type) \
                 VALUES ('pizza', 'Food', 250, '2025-01-30', NULL);",
                "I spent 250 on pizza",
                StatementKind::Insert,
            ),
            (
                "SELECT * FROM Finance WHERE categorization = 'Food' AND date = date('now', '-1 day');",
                "Show me all food from yesterday",
                StatementKind::Select,
            ),
            (
                "UPDATE Finance SET amount = 300 WHERE id = (SELECT id FROM Finance ORDER BY id DESC LIMIT 1);",
                "Change the last expense to 300",
                StatementKind::Update,
            ),
            (
                "DELETE FROM Finance WHERE id = (SELECT id FROM Finance ORDER BY id DESC LIMIT 1);",
                "Delete the last transaction",
                StatementKind::Delete,
            ),
        ];

        for (sql, question, kind) in cases {
            assert_eq!(
                StatementValidator::validate(sql, question),
                Verdict::Accepted(kind),
                "{}",
                sql
            );
        }
    }

    #[test]
    fn test_strip_string_literals() {
        let scrubbed = strip_string_literals("SELECT * FROM Finance WHERE purchased = 'drop it''s'");
        assert!(!scrubbed.contains("drop"));
        assert!(scrubbed.contains("Finance"));
    }
}
