//! Instruction contract for the query synthesizer
//!
//! The contract pins the target table and its columns, enumerates the
//! fixed categories, states the safety rules and carries worked examples
//! for the four supported statement patterns. It is a versioned value so
//! tests and deployments can swap it without touching pipeline logic.

use crate::models::Category;
use crate::Result;
use chrono::Utc;
use std::path::Path;

/// Version tag of the built-in contract text.
pub const BUILTIN_CONTRACT_VERSION: &str = "v1";

/// Versioned system instructions handed to the generative service.
#[derive(Debug, Clone)]
pub struct PromptContract {
    pub version: String,
    system_instructions: String,
}

impl PromptContract {
    /// The built-in contract, mirroring the schema the executor enforces.
    pub fn builtin() -> Self {
        let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

        let text = format!(
            r#"You are an expenses-to-SQL assistant for a simple personal financial tracker.
Your job is to convert natural language into ONE safe SQL statement.
You can INSERT, SELECT, UPDATE, or DELETE data.

SAFETY & SECURITY RULES:
1. NO DESTRUCTIVE DDL: never generate DROP, TRUNCATE, ALTER, or GRANT.
2. SAFE UPDATES/DELETES:
   - Mutating statements cannot rely on result ordering. If the user asks to
     update or delete "the last" record, express it as a deterministic subquery:
     UPDATE Finance SET amount = 300 WHERE id = (SELECT id FROM Finance ORDER BY id DESC LIMIT 1);
   - Never update or delete without a WHERE clause unless the user explicitly
     asks to delete all records.

STRICT SCHEMA:
- Table: Finance
- Columns: id (INTEGER), purchased (TEXT), categorization (TEXT), amount (REAL), date (TEXT, YYYY-MM-DD), payment_type (TEXT, nullable).
- Never invent other tables or columns.
- categorization must be normalized to one of: [{categories}].

EXAMPLES:

Input: "I spent 250 on pizza"
Output: INSERT INTO Finance (purchased, categorization, amount, date, payment_type) VALUES ('pizza', 'Food', 250, '{today}', NULL);

Input: "Show me all food from yesterday"
Output: SELECT * FROM Finance WHERE categorization = 'Food' AND date = date('now', '-1 day');

Input: "Change the last expense to 300 instead of 250"
Output: UPDATE Finance SET amount = 300 WHERE id = (SELECT id FROM Finance ORDER BY id DESC LIMIT 1);

Input: "Delete the last transaction"
Output: DELETE FROM Finance WHERE id = (SELECT id FROM Finance ORDER BY id DESC LIMIT 1);

Today's date is {today}.
Output ONLY the text of the SQL. No markdown fences, no explanation."#,
            categories = categories.join(", "),
            today = Utc::now().format("%Y-%m-%d"),
        );

        Self {
            version: BUILTIN_CONTRACT_VERSION.to_string(),
            system_instructions: text,
        }
    }

    /// Load a replacement contract from disk. The version tag is the file
    /// stem, so swapped contracts remain distinguishable in logs.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let version = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("custom")
            .to_string();

        Ok(Self {
            version,
            system_instructions: text,
        })
    }

    pub fn system_instructions(&self) -> &str {
        &self.system_instructions
    }
}

impl Default for PromptContract {
    fn default() -> Self {
        Self::builtin()
    }
}
