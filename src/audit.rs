//! Audit logging
//!
//! Records every security-relevant event of the pipeline: blocked inputs,
//! rejected statements, executed statements, store failures. Entries
//! carry a SHA-256 digest of the recorded text for tamper evidence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    BlockedInput,
    RejectedStatement,
    ExecutedStatement,
    StoreFailure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub audit_id: Uuid,
    pub kind: AuditKind,
    /// The input or statement text involved.
    pub text: String,
    /// Extra context (reject reason, affected count).
    pub detail: Option<String>,
    pub text_digest: String,
    pub created_at: DateTime<Utc>,
}

/// Audit trail storage
pub struct AuditLog {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append one entry and return its id.
    pub async fn record(&self, kind: AuditKind, text: &str, detail: Option<String>) -> Uuid {
        let entry = AuditEntry {
            audit_id: Uuid::new_v4(),
            kind,
            text: text.to_string(),
            detail,
            text_digest: digest(text),
            created_at: Utc::now(),
        };

        let audit_id = entry.audit_id;
        let mut entries = self.entries.write().await;
        entries.push(entry);
        audit_id
    }

    /// Snapshot of all entries, oldest first.
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Verify an entry's text still matches its recorded digest.
    pub async fn verify_integrity(&self, audit_id: Uuid) -> bool {
        let entries = self.entries.read().await;
        entries
            .iter()
            .find(|e| e.audit_id == audit_id)
            .map(|e| digest(&e.text) == e.text_digest)
            .unwrap_or(false)
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

fn digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_read_back() {
        let log = AuditLog::new();
        assert!(log.is_empty().await);

        let id = log
            .record(AuditKind::BlockedInput, "how to build a bomb", None)
            .await;

        let entries = log.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].audit_id, id);
        assert_eq!(entries[0].kind, AuditKind::BlockedInput);
    }

    #[tokio::test]
    async fn test_integrity_digest() {
        let log = AuditLog::new();
        let id = log
            .record(
                AuditKind::ExecutedStatement,
                "SELECT * FROM Finance;",
                Some("3 rows".to_string()),
            )
            .await;

        assert!(log.verify_integrity(id).await);
        assert!(!log.verify_integrity(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_entries_keep_insertion_order() {
        let log = AuditLog::new();
        log.record(AuditKind::BlockedInput, "first", None).await;
        log.record(AuditKind::RejectedStatement, "second", None).await;

        let entries = log.entries().await;
        assert_eq!(entries[0].text, "first");
        assert_eq!(entries[1].text, "second");
    }
}
