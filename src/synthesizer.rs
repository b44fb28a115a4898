//! Query Synthesizer
//!
//! Converts classifier-approved text into one SQL statement via the
//! generative service, under the fixed instruction contract. The trait
//! seam allows the pipeline to run against a test double.

use crate::contract::PromptContract;
use crate::error::TrackerError;
use crate::groq::GroqClient;
use crate::models::{GeneratedStatement, StatementKind};
use crate::Result;
use async_trait::async_trait;
use tracing::{info, warn};

/// Outcome of one synthesis attempt.
#[derive(Debug, Clone)]
pub enum Synthesis {
    /// Exactly one SQL statement, ready for validation.
    Statement(GeneratedStatement),
    /// The model refused the request; carries the decline text verbatim.
    /// Never passed to execution.
    Declined(String),
    /// Service unreachable, misconfigured, or timed out.
    Unavailable,
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, question: &str) -> Result<Synthesis>;
}

/// Refusal language the model emits instead of SQL.
const REFUSAL_MARKERS: &[&str] = &[
    "misuse",
    "spam",
    "cannot assist",
    "can't assist",
    "cannot help",
    "can't help",
];

/// Groq-backed synthesizer. Built once at startup; holds an explicit
/// unavailable state when credentials are absent.
pub struct GroqSynthesizer {
    client: Option<GroqClient>,
    contract: PromptContract,
}

impl GroqSynthesizer {
    pub fn new(client: Option<GroqClient>, contract: PromptContract) -> Self {
        Self { client, contract }
    }

    /// Build from an optional API key; an absent or empty key yields the
    /// unavailable state rather than a failing client.
    pub fn from_api_key(api_key: Option<String>, contract: PromptContract) -> Result<Self> {
        let client = match api_key {
            Some(key) if !key.trim().is_empty() => Some(GroqClient::new(key)?),
            _ => {
                warn!("GROQ_API_KEY not configured, synthesizer starts unavailable");
                None
            }
        };

        Ok(Self::new(client, contract))
    }

    pub fn contract_version(&self) -> &str {
        &self.contract.version
    }
}

#[async_trait]
impl Synthesizer for GroqSynthesizer {
    async fn synthesize(&self, question: &str) -> Result<Synthesis> {
        let Some(client) = &self.client else {
            return Ok(Synthesis::Unavailable);
        };

        info!(contract_version = %self.contract.version, "Synthesizing SQL");

        let raw = match client
            .complete(self.contract.system_instructions(), question)
            .await
        {
            Ok(text) => text,
            Err(TrackerError::GenerationUnavailable(reason)) => {
                warn!("Generation unavailable: {}", reason);
                return Ok(Synthesis::Unavailable);
            }
            Err(e) => return Err(e),
        };

        let cleaned = strip_fences(&raw);

        if is_refusal(cleaned) {
            warn!("Model declined request: {}", cleaned);
            return Ok(Synthesis::Declined(cleaned.to_string()));
        }

        // Kind inference is advisory here; an unrecognized leading keyword
        // is the validator's rejection to make, not a synthesis failure.
        let kind = StatementKind::from_sql(cleaned).unwrap_or(StatementKind::Select);

        Ok(Synthesis::Statement(GeneratedStatement {
            sql: cleaned.to_string(),
            kind,
        }))
    }
}

/// Strip accidental markdown fencing despite the contract forbidding it.
fn strip_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```sql")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn is_refusal(text: &str) -> bool {
    let lowered = text.to_lowercase();
    REFUSAL_MARKERS.iter().any(|marker| lowered.contains(marker))
}
