//! Error recovery strategies

use std::collections::HashMap;
use tracing::Level;
use super::BotError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Abandon the current cycle and try again on the next tick.
    SkipCycle { log_level: Level },
    /// Stop the agent; the error cannot be fixed by waiting.
    Shutdown { reason: String },
}

/// Classifies pipeline errors and keeps per-class counters for the session
/// report.
#[derive(Debug, Default)]
pub struct ErrorRecovery {
    error_counts: HashMap<&'static str, u32>,
}

impl ErrorRecovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_error(&mut self, error: &BotError) -> RecoveryAction {
        let class = classify_error(error);
        *self.error_counts.entry(class).or_insert(0) += 1;

        if error.is_fatal() {
            return RecoveryAction::Shutdown {
                reason: error.to_string(),
            };
        }

        let log_level = match error {
            BotError::InvalidMarketData { .. } | BotError::Advisory { .. } => Level::WARN,
            _ => Level::ERROR,
        };
        RecoveryAction::SkipCycle { log_level }
    }

    pub fn error_counts(&self) -> &HashMap<&'static str, u32> {
        &self.error_counts
    }

    pub fn total_errors(&self) -> u32 {
        self.error_counts.values().sum()
    }
}

pub fn classify_error(error: &BotError) -> &'static str {
    match error {
        BotError::Network { .. } => "network",
        BotError::DataParsing { .. } => "parse_error",
        BotError::InvalidMarketData { .. } => "invalid_price",
        BotError::Advisory { .. } => "advisory",
        BotError::Signing { .. } => "signing",
        BotError::NonceReplay { .. } => "nonce_replay",
        BotError::Execution { .. } => "execution",
        BotError::Settlement { .. } => "settlement",
        BotError::Config { .. } => "config",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn transient_errors_skip_the_cycle() {
        let mut recovery = ErrorRecovery::new();
        let action = recovery.handle_error(&BotError::Network {
            message: "timeout".into(),
            source: None,
            retry_count: 3,
        });
        assert_eq!(action, RecoveryAction::SkipCycle { log_level: Level::ERROR });

        let action = recovery.handle_error(&BotError::invalid_data("CEX", dec!(0), "zero price"));
        assert_eq!(action, RecoveryAction::SkipCycle { log_level: Level::WARN });
        assert_eq!(recovery.total_errors(), 2);
    }

    #[test]
    fn signing_errors_shut_down() {
        let mut recovery = ErrorRecovery::new();
        let action = recovery.handle_error(&BotError::Signing {
            message: "bad key".into(),
        });
        assert!(matches!(action, RecoveryAction::Shutdown { .. }));
        assert_eq!(recovery.error_counts().get("signing"), Some(&1));
    }
}
