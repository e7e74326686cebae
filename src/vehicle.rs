//! Vehicle entities: [`Drive`] and [`Locomotive`].
//!
//! Both own a single current `(direction, speed)` pair and change it only
//! through [`Vehicle::operate`]. `Drive` additionally keeps every state it
//! has reached, each with its own id and timestamp.
//!
//! # No-op suppression
//!
//! `operate` returns `false` and leaves the vehicle untouched when the
//! requested pair equals the current one. Interactors use the return value
//! to decide whether the motor and shadow need to hear about it.
//!
//! ```rust
//! use iotrain::{Direction, Drive, Speed, Vehicle};
//!
//! let mut drive = Drive::new();
//! let ten = Speed::new(10).unwrap();
//!
//! assert!(drive.operate(Some(Direction::Forward), Some(ten)));
//! assert!(!drive.operate(Some(Direction::Forward), Some(ten)));
//! assert_eq!(drive.history().len(), 2);
//! ```

use core::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::motion::{Direction, Speed};

/// A controllable vehicle with one current direction and speed.
pub trait Vehicle {
    /// Current direction.
    fn direction(&self) -> Direction;

    /// Current speed.
    fn speed(&self) -> Speed;

    /// Apply a transition. `None` keeps the current value for that axis.
    ///
    /// Returns `true` if the state changed.
    fn operate(&mut self, direction: Option<Direction>, speed: Option<Speed>) -> bool;

    /// Snapshot of the current pair.
    fn status(&self) -> VehicleStatus {
        VehicleStatus {
            direction: self.direction(),
            speed: self.speed(),
        }
    }
}

/// The current `(direction, speed)` pair of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub struct VehicleStatus {
    /// Current direction.
    pub direction: Direction,
    /// Current speed.
    pub speed: Speed,
}

// ============================================================================
// Identifiers
// ============================================================================

/// Unique id of a [`Drive`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DriveId(Uuid);

impl DriveId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for DriveId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DriveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique id of a [`DriveState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StateId(Uuid);

impl StateId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Drive (history-tracking)
// ============================================================================

/// One state a [`Drive`] has been in.
#[derive(Clone, Debug, Serialize)]
pub struct DriveState {
    /// Unique id of this state.
    pub id: StateId,
    /// Direction while in this state.
    pub direction: Direction,
    /// Speed while in this state.
    pub speed: Speed,
    /// When the state was reached.
    pub reported_at: DateTime<Utc>,
}

impl DriveState {
    fn new(direction: Direction, speed: Speed) -> Self {
        Self {
            id: StateId::new(),
            direction,
            speed,
            reported_at: Utc::now(),
        }
    }
}

/// Drive entity with an append-only history of states.
///
/// The history is never empty; the last entry is the current state.
#[derive(Clone, Debug)]
pub struct Drive {
    id: DriveId,
    history: Vec<DriveState>,
    started_at: DateTime<Utc>,
}

impl Drive {
    /// Create a drive with a fresh id, stopped at speed 0.
    pub fn new() -> Self {
        Self::with_id(DriveId::new())
    }

    /// Create a drive with the given id, stopped at speed 0.
    pub fn with_id(id: DriveId) -> Self {
        Self {
            id,
            history: vec![DriveState::new(Direction::Stop, Speed::ZERO)],
            started_at: Utc::now(),
        }
    }

    /// Id of this drive.
    pub fn id(&self) -> DriveId {
        self.id
    }

    /// When the drive was created.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The state the drive is in now.
    pub fn current_state(&self) -> &DriveState {
        // History starts with the initial state and is only ever appended to.
        &self.history[self.history.len() - 1]
    }

    /// Every state reached so far, oldest first.
    pub fn history(&self) -> &[DriveState] {
        &self.history
    }
}

impl Default for Drive {
    fn default() -> Self {
        Self::new()
    }
}

impl Vehicle for Drive {
    fn direction(&self) -> Direction {
        self.current_state().direction
    }

    fn speed(&self) -> Speed {
        self.current_state().speed
    }

    fn operate(&mut self, direction: Option<Direction>, speed: Option<Speed>) -> bool {
        let current = self.current_state();
        let direction = direction.unwrap_or(current.direction);
        let speed = speed.unwrap_or(current.speed);

        if direction == current.direction && speed == current.speed {
            return false;
        }

        self.history.push(DriveState::new(direction, speed));
        true
    }
}

// ============================================================================
// Locomotive (current state only)
// ============================================================================

/// Locomotive entity keeping only its current pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Locomotive {
    direction: Direction,
    speed: Speed,
}

impl Locomotive {
    /// Create a stopped locomotive.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Vehicle for Locomotive {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn speed(&self) -> Speed {
        self.speed
    }

    fn operate(&mut self, direction: Option<Direction>, speed: Option<Speed>) -> bool {
        let direction = direction.unwrap_or(self.direction);
        let speed = speed.unwrap_or(self.speed);

        if direction == self.direction && speed == self.speed {
            return false;
        }

        self.direction = direction;
        self.speed = speed;
        true
    }
}
