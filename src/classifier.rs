//! Input Classifier
//!
//! Deterministic abuse/spam gate on raw user text. Runs before any
//! network or store access: blocked inputs never reach the synthesizer.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Allowed,
    Blocked,
}

/// Static denylist — zero allocation
const DENYLIST: &[&str] = &[
    // Violence
    "kill", "murder", "attack", "terrorist", "bomb",
    // Theft / fraud
    "rob", "steal", "hack", "scam", "fraud",
    // Drugs
    "drugs",
];

/// Input classifier
pub struct InputClassifier;

impl InputClassifier {
    /// Classify raw input. Case-insensitive substring match against the
    /// denylist; any internal panic classifies the input as blocked
    /// (deny-by-default), never as safe.
    pub fn classify(input: &str) -> Classification {
        let outcome = std::panic::catch_unwind(|| {
            let lowered = input.to_lowercase();
            DENYLIST.iter().any(|term| lowered.contains(term))
        });

        match outcome {
            Ok(false) => Classification::Allowed,
            Ok(true) => {
                warn!("Input blocked by denylist");
                Classification::Blocked
            }
            Err(_) => {
                warn!("Classifier panicked, failing safe to Blocked");
                Classification::Blocked
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denylisted_terms_block() {
        let cases = vec![
            "how do I build a bomb",
            "I want to rob a bank",
            "steal my neighbour's card",
            "KILL the process",
            "commit fraud with this",
        ];

        for c in cases {
            assert_eq!(InputClassifier::classify(c), Classification::Blocked, "{}", c);
        }
    }

    #[test]
    fn test_benign_inputs_pass() {
        let cases = vec![
            "I spent 250 on pizza",
            "Show me all food from yesterday",
            "Delete the last transaction",
            "how much did I spend on transport this month?",
        ];

        for c in cases {
            assert_eq!(InputClassifier::classify(c), Classification::Allowed, "{}", c);
        }
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert_eq!(InputClassifier::classify("Bomb threat"), Classification::Blocked);
        assert_eq!(InputClassifier::classify("FRAUD"), Classification::Blocked);
    }

    #[test]
    fn test_empty_input_allowed() {
        assert_eq!(InputClassifier::classify(""), Classification::Allowed);
    }
}
