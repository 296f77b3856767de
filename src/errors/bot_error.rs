//! Custom error types for the bot

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Data parsing error: {context}")]
    DataParsing {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid market data: {venue} price {price} - {reason}")]
    InvalidMarketData {
        venue: String,
        price: Decimal,
        reason: String,
    },

    #[error("Advisory service unavailable: {message}")]
    Advisory {
        message: String,
    },

    #[error("Settlement signing failed: {message}")]
    Signing {
        message: String,
    },

    #[error("Nonce {nonce} was already used for a settlement")]
    NonceReplay {
        nonce: String,
    },

    #[error("Trade execution failed: {message}")]
    Execution {
        message: String,
    },

    #[error("Settlement delivery failed: {message}")]
    Settlement {
        message: String,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },
}

impl BotError {
    pub fn config(message: impl Into<String>) -> Self {
        BotError::Config { message: message.into() }
    }

    pub fn invalid_data(venue: &str, price: Decimal, reason: impl Into<String>) -> Self {
        BotError::InvalidMarketData {
            venue: venue.to_string(),
            price,
            reason: reason.into(),
        }
    }

    pub fn parsing(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        BotError::DataParsing {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Errors that mean the agent's own key material or configuration is
    /// broken. These stop the process instead of the cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BotError::Signing { .. } | BotError::NonceReplay { .. } | BotError::Config { .. }
        )
    }
}

pub type BotResult<T> = Result<T, BotError>;
