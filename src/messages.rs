//! Wire types for the device shadow and the HTTP API.
//!
//! # Shadow report
//!
//! Only the axes that are set appear in the report:
//!
//! ```json
//! {"state": {"reported": {"direction": "FORWARD", "speed": 10}}}
//! {"state": {"reported": {"speed": 10}}}
//! ```
//!
//! # Shadow delta
//!
//! The shadow service pushes desired-vs-reported differences as
//!
//! ```json
//! {"version": 12, "timestamp": 1700000000, "state": {"drive": {"speed": 40}}}
//! ```
//!
//! The command mapping is `state.drive` when it is a non-empty object. A
//! delta without `drive` is read as a flat command if `state` names an axis
//! directly. Anything else carries no drive command.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::commands::{DIRECTION_KEY, SPEED_KEY, THROTTLE_KEY};
use crate::motion::{Direction, Speed};
use crate::vehicle::VehicleStatus;

/// Key under `state` that nests the drive command in a delta.
pub const DRIVE_KEY: &str = "drive";

// ============================================================================
// Shadow Report
// ============================================================================

/// Sparse `reported` section of a shadow update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriveReport {
    /// Reported direction, omitted when not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Reported speed, omitted when not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Speed>,
}

impl DriveReport {
    /// Returns true if no axis is set.
    pub fn is_empty(&self) -> bool {
        self.direction.is_none() && self.speed.is_none()
    }
}

/// `state` section of a shadow update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportedState {
    /// State reported by the device.
    pub reported: DriveReport,
}

/// Full shadow update document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShadowReport {
    /// Reported state wrapper.
    pub state: ReportedState,
}

impl ShadowReport {
    /// Build a report from the given axes.
    pub fn new(direction: Option<Direction>, speed: Option<Speed>) -> Self {
        Self {
            state: ReportedState {
                reported: DriveReport { direction, speed },
            },
        }
    }

    /// Returns true if the report carries no axis.
    pub fn is_empty(&self) -> bool {
        self.state.reported.is_empty()
    }
}

// ============================================================================
// Shadow Delta
// ============================================================================

/// Delta notification pushed by the shadow service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShadowDelta {
    /// Shadow document version.
    #[serde(default)]
    pub version: Option<u64>,
    /// Server timestamp (seconds since epoch).
    #[serde(default)]
    pub timestamp: Option<u64>,
    /// Desired fields that differ from the reported state.
    #[serde(default)]
    pub state: Map<String, Value>,
}

impl ShadowDelta {
    /// Parse a delta payload. Anything but a JSON object is rejected.
    pub fn from_slice(payload: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(payload)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom("delta must be a JSON object"));
        }
        serde_json::from_value(value)
    }

    /// The drive command mapping carried by this delta.
    ///
    /// Returns `None` if `state.drive` is empty or not an object, or if
    /// there is no `drive` and `state` names no axis either. Such deltas
    /// concern other desired fields and are not for the drive.
    pub fn drive_command(&self) -> Option<&Map<String, Value>> {
        match self.state.get(DRIVE_KEY) {
            Some(Value::Object(drive)) if !drive.is_empty() => Some(drive),
            Some(_) => None,
            None => {
                let names_axis = [DIRECTION_KEY, SPEED_KEY, THROTTLE_KEY]
                    .iter()
                    .any(|key| self.state.contains_key(*key));
                names_axis.then_some(&self.state)
            }
        }
    }
}

// ============================================================================
// HTTP API
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error messages (present when success=false)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// Create an error response with a single message
    pub fn err(message: impl Into<String>) -> Self {
        Self::errs(vec![message.into()])
    }

    /// Create an error response with several messages
    pub fn errs(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            errors,
        }
    }
}

/// Vehicle state as returned by the HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    /// Current direction
    pub direction: Direction,
    /// Current speed (0-100)
    pub speed: Speed,
    /// Whether the last command changed the state (absent for reads)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
}

impl From<VehicleStatus> for StateResponse {
    fn from(status: VehicleStatus) -> Self {
        Self {
            direction: status.direction,
            speed: status.speed,
            changed: None,
        }
    }
}
