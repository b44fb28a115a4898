//! Finance Tracker backend
//!
//! Turns freeform natural language about personal expenses into exactly
//! one validated SQL statement, executes it against SQLite, and shapes a
//! user-facing response:
//!
//! INPUT → CLASSIFY → SYNTHESIZE → VALIDATE → EXECUTE → FORMAT
//!
//! The pipeline is strictly linear per request. Blocked, declined,
//! rejected and failed requests all terminate without retries; the store
//! is the only state shared across requests.

pub mod api;
pub mod audit;
pub mod classifier;
pub mod contract;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod groq;
pub mod models;
pub mod pipeline;
pub mod synthesizer;
pub mod validator;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use pipeline::Pipeline;
