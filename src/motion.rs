//! Motion value types: [`Direction`] and [`Speed`].
//!
//! Both are small `Copy` values validated at construction, so anything
//! holding one can rely on it being in range.
//!
//! # Example
//!
//! ```rust
//! use iotrain::{Direction, Speed};
//!
//! let speed = Speed::new(40).unwrap();
//! assert_eq!(speed.value(), 40);
//! assert!(Speed::new(101).is_err());
//!
//! assert_eq!("FORWARD".parse::<Direction>(), Ok(Direction::Forward));
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DirectionParseError, SpeedRangeError};

/// Direction of travel.
///
/// Wire names are the upper-case member names (`"STOP"`, `"FORWARD"`,
/// `"BACKWARD"`) and are matched case-sensitively.
///
/// # Default
///
/// Defaults to [`Stop`](Self::Stop).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Not moving. The motor output is zero whatever the speed.
    #[default]
    Stop,
    /// Moving forward (positive motor output).
    Forward,
    /// Moving in reverse (negative motor output).
    Backward,
}

impl Direction {
    /// Every member, in declaration order.
    pub const ALL: [Direction; 3] = [Direction::Stop, Direction::Forward, Direction::Backward];

    /// Returns the wire name of the direction.
    ///
    /// ```
    /// use iotrain::Direction;
    ///
    /// assert_eq!(Direction::Stop.as_str(), "STOP");
    /// assert_eq!(Direction::Backward.as_str(), "BACKWARD");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Stop => "STOP",
            Direction::Forward => "FORWARD",
            Direction::Backward => "BACKWARD",
        }
    }

    /// Member names joined with `sep`, in declaration order.
    pub fn names(sep: &str) -> String {
        Self::ALL
            .iter()
            .map(Direction::as_str)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DirectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| DirectionParseError { name: s.into() })
    }
}

/// Speed as an integer percentage of full throttle.
///
/// Always within `0..=100`. Serializes as a bare integer and deserializes
/// through the same range check.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Speed(u8);

impl Speed {
    /// Largest legal value.
    pub const MAX: u8 = 100;

    /// Zero speed.
    pub const ZERO: Speed = Speed(0);

    /// Validates `value` and wraps it.
    pub fn new(value: i64) -> Result<Self, SpeedRangeError> {
        match u8::try_from(value) {
            Ok(v) if v <= Self::MAX => Ok(Self(v)),
            _ => Err(SpeedRangeError { value }),
        }
    }

    /// The stored percentage.
    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Speed {
    type Error = SpeedRangeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Speed: {}>", self.0)
    }
}
