//! Parsing untrusted command mappings into typed operate commands.
//!
//! Commands arrive as JSON objects from the shadow delta or the HTTP API.
//! [`OperateCommand::from_map`] turns one into either a valid command or an
//! [`InvalidCommand`] holding every problem found, in field order
//! (direction first, then speed).
//!
//! # Field policies
//!
//! - [`FieldPolicy::AllRequired`]: both fields must be present. Used for a
//!   one-shot operate request.
//! - [`FieldPolicy::PartialUpdate`]: a missing field means "leave this axis
//!   alone", but at least one must be given. Used for shadow deltas.
//!
//! ```rust
//! use iotrain::{Direction, FieldPolicy, OperateCommand};
//! use serde_json::json;
//!
//! let raw = json!({"direction": "FORWARD", "speed": 10});
//! let cmd = OperateCommand::from_map(raw.as_object().unwrap(), FieldPolicy::AllRequired).unwrap();
//! assert_eq!(cmd.direction, Some(Direction::Forward));
//!
//! let raw = json!({});
//! let invalid = OperateCommand::from_map(raw.as_object().unwrap(), FieldPolicy::PartialUpdate).unwrap_err();
//! assert_eq!(invalid.errors(), ["direction or speed must be specified"]);
//! ```

use core::fmt;

use serde_json::{Map, Value};

use crate::motion::{Direction, Speed};

/// Key holding the direction name.
pub const DIRECTION_KEY: &str = "direction";

/// Key holding the speed percentage.
pub const SPEED_KEY: &str = "speed";

/// Accepted alias for [`SPEED_KEY`], used when `speed` itself is absent.
pub const THROTTLE_KEY: &str = "throttle";

/// Error recorded when no axis is given under [`FieldPolicy::PartialUpdate`].
pub const MISSING_AXES_ERROR: &str = "direction or speed must be specified";

/// Error recorded for a missing or malformed speed.
pub const SPEED_ERROR: &str = "speed must be integer between 0 and 100";

/// Error recorded for a missing or unknown direction.
pub fn direction_error() -> String {
    format!("direction must be {}", Direction::names(" or "))
}

/// How absent fields are treated by [`OperateCommand::from_map`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FieldPolicy {
    /// Every field must be present and valid.
    AllRequired,
    /// Fields may be absent, but not all of them.
    #[default]
    PartialUpdate,
}

/// A validated operate command.
///
/// A `None` axis is left unchanged when the command is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct OperateCommand {
    /// Requested direction, if any.
    pub direction: Option<Direction>,
    /// Requested speed, if any.
    pub speed: Option<Speed>,
}

/// Outcome of parsing an operate command.
pub type CommandResult = Result<OperateCommand, InvalidCommand>;

impl OperateCommand {
    /// Command setting both axes.
    pub fn new(direction: Direction, speed: Speed) -> Self {
        Self {
            direction: Some(direction),
            speed: Some(speed),
        }
    }

    /// Parse a raw mapping under the given policy.
    ///
    /// Unrecognized keys are ignored.
    pub fn from_map(raw: &Map<String, Value>, policy: FieldPolicy) -> CommandResult {
        let mut invalid = InvalidCommand::new();

        let direction = match raw.get(DIRECTION_KEY) {
            Some(value) => {
                let parsed = parse_direction(value);
                if parsed.is_none() {
                    invalid.add_error(direction_error());
                }
                parsed
            }
            None => {
                if policy == FieldPolicy::AllRequired {
                    invalid.add_error(direction_error());
                }
                None
            }
        };

        let speed = match raw.get(SPEED_KEY).or_else(|| raw.get(THROTTLE_KEY)) {
            Some(value) => {
                let parsed = parse_speed(value);
                if parsed.is_none() {
                    invalid.add_error(SPEED_ERROR);
                }
                parsed
            }
            None => {
                if policy == FieldPolicy::AllRequired {
                    invalid.add_error(SPEED_ERROR);
                }
                None
            }
        };

        if policy == FieldPolicy::PartialUpdate && direction.is_none() && speed.is_none() && !invalid.has_errors() {
            invalid.add_error(MISSING_AXES_ERROR);
        }

        if invalid.has_errors() {
            return Err(invalid);
        }

        Ok(Self { direction, speed })
    }

    /// Parse any JSON value; non-objects are rejected like an empty mapping
    /// would be under `AllRequired`, or with the missing-axes error otherwise.
    pub fn from_value(raw: &Value, policy: FieldPolicy) -> CommandResult {
        match raw.as_object() {
            Some(map) => Self::from_map(map, policy),
            None => Self::from_map(&Map::new(), policy),
        }
    }

    /// Returns true if neither axis is set.
    pub fn is_empty(&self) -> bool {
        self.direction.is_none() && self.speed.is_none()
    }
}

impl fmt::Display for OperateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = self.direction.map(|d| d.as_str()).unwrap_or("-");
        match self.speed {
            Some(speed) => write!(f, "OperateCommand(direction={}, speed={})", direction, speed),
            None => write!(f, "OperateCommand(direction={}, speed=-)", direction),
        }
    }
}

fn parse_direction(value: &Value) -> Option<Direction> {
    value.as_str().and_then(|s| s.parse().ok())
}

fn parse_speed(value: &Value) -> Option<Speed> {
    // `as_i64` is `None` for floats, strings, booleans and null.
    value.as_i64().and_then(|v| Speed::new(v).ok())
}

// ============================================================================
// Invalid Command
// ============================================================================

/// Accumulated validation errors for a rejected command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvalidCommand {
    errors: Vec<String>,
}

impl InvalidCommand {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one error message.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Returns true if any error has been recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Recorded errors, in the order they were found.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Consume and return the recorded errors.
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

impl fmt::Display for InvalidCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvalidCommand(errors={:?})", self.errors)
    }
}

impl std::error::Error for InvalidCommand {}
