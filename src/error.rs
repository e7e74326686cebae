//! Error types shared across the crate.
//!
//! Field-level validation problems are not errors in this sense: they are
//! collected as data in [`InvalidCommand`](crate::commands::InvalidCommand).
//! The types here cover the failures that propagate to the caller.

use thiserror::Error;

use crate::commands::InvalidCommand;

/// A [`Speed`](crate::Speed) was constructed outside of `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("speed must be between 0 and 100, got {value}")]
pub struct SpeedRangeError {
    /// The rejected raw value.
    pub value: i64,
}

/// A direction name did not match any [`Direction`](crate::Direction) member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction {name:?}")]
pub struct DirectionParseError {
    /// The rejected input.
    pub name: String,
}

/// Failure reported by a motor or shadow gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The motor driver rejected the output value.
    #[error("motor driver error: {0}")]
    Motor(String),

    /// The shadow report could not be handed to the transport.
    #[error("shadow update error: {0}")]
    Shadow(String),

    /// The shadow report could not be encoded.
    #[error("failed to encode shadow report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure of an interactor `execute` call.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The interactor was handed a rejected command.
    #[error("operation rejected: {0}")]
    InvalidCommand(InvalidCommand),

    /// A downstream gateway failed after the vehicle state was applied.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// A configuration value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The value does not fit the field's fixed capacity.
    #[error("{field} is {len} bytes, at most {max} allowed")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Length of the rejected value in bytes.
        len: usize,
        /// Capacity of the field in bytes.
        max: usize,
    },

    /// The value could not be parsed.
    #[error("invalid {field}: {value:?}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected input.
        value: String,
    },
}

impl OperationError {
    /// Validation messages when the command itself was rejected.
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            Self::InvalidCommand(invalid) => Some(invalid.errors()),
            Self::Gateway(_) => None,
        }
    }
}
