//! Mock implementations for testing without hardware.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockMotorDriver`] | [`MotorDriver`] | Tracks signed speed calls |
//! | [`MockMqtt`] | [`MqttClient`] | Captures pub/sub operations |
//! | [`RecordingMotorGateway`] | [`MotorGateway`] | Records `control` calls |
//! | [`RecordingShadowGateway`] | [`ShadowGateway`] | Records `update` calls |
//!
//! The recording gateways share their log between clones, so a test can
//! hand one clone to an interactor and inspect the other.
//!
//! # Example
//!
//! ```rust
//! use iotrain::hal::{RecordingMotorGateway, RecordingShadowGateway};
//! use iotrain::usecases::{OperateInputPort, OperateInteractor};
//! use iotrain::{Direction, Locomotive, OperateCommand, SharedVehicle, Speed};
//!
//! let motor = RecordingMotorGateway::new();
//! let shadow = RecordingShadowGateway::new();
//! let mut interactor = OperateInteractor::new(
//!     SharedVehicle::new(Locomotive::new()),
//!     motor.clone(),
//!     shadow.clone(),
//! );
//!
//! let command = OperateCommand::new(Direction::Forward, Speed::new(10).unwrap());
//! interactor.execute(Ok(command)).unwrap();
//!
//! assert_eq!(motor.calls(), vec![(Direction::Forward, Speed::new(10).unwrap())]);
//! assert_eq!(shadow.updates().len(), 1);
//! ```
//!
//! [`MotorDriver`]: crate::traits::MotorDriver
//! [`MqttClient`]: crate::traits::MqttClient
//! [`MotorGateway`]: crate::traits::MotorGateway
//! [`ShadowGateway`]: crate::traits::ShadowGateway

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::GatewayError;
use crate::motion::{Direction, Speed};
use crate::traits::{MotorDriver, MotorGateway, MqttClient, ShadowGateway};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock motor driver for testing.
///
/// Records every signed output. Use the public fields to inspect state
/// after test operations.
///
/// # Example
///
/// ```rust
/// use iotrain::hal::MockMotorDriver;
/// use iotrain::traits::MotorDriver;
///
/// let mut motor = MockMotorDriver::new();
/// motor.set_speed(75).unwrap();
/// motor.set_speed(-20).unwrap();
///
/// assert_eq!(motor.speed, -20);
/// assert_eq!(motor.calls, vec![75, -20]);
/// ```
#[derive(Debug, Default)]
pub struct MockMotorDriver {
    /// Current signed output.
    pub speed: i8,
    /// Every value passed to `set_speed`, in order.
    pub calls: Vec<i8>,
    /// When true, `set_speed` fails without recording.
    pub fail: bool,
}

impl MockMotorDriver {
    /// Creates a new mock motor at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock motor that rejects every output.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl MotorDriver for MockMotorDriver {
    type Error = &'static str;

    fn set_speed(&mut self, speed: i8) -> Result<(), Self::Error> {
        if self.fail {
            return Err("motor offline");
        }
        self.speed = speed;
        self.calls.push(speed);
        Ok(())
    }
}

// ============================================================================
// Network Mocks
// ============================================================================

/// Mock MQTT client for testing.
///
/// Records all publish/subscribe operations. Publishing fails while
/// `connected` is false or `fail_publish` is set.
///
/// # Example
///
/// ```rust
/// use iotrain::hal::MockMqtt;
/// use iotrain::traits::MqttClient;
///
/// let mut mqtt = MockMqtt::new();
///
/// mqtt.subscribe("$aws/things/train/shadow/update/delta").unwrap();
/// assert!(mqtt.is_subscribed("$aws/things/train/shadow/update/delta"));
///
/// mqtt.publish("$aws/things/train/shadow/update", b"{}", false).unwrap();
/// assert_eq!(mqtt.published_to("$aws/things/train/shadow/update").len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockMqtt {
    /// Messages that have been published (topic, payload, retain).
    pub published: Vec<(String, Vec<u8>, bool)>,
    /// Topics that have been subscribed to.
    pub subscriptions: Vec<String>,
    /// Whether the client is connected.
    pub connected: bool,
    /// When true, `publish` fails without recording.
    pub fail_publish: bool,
}

impl MockMqtt {
    /// Creates a new mock MQTT client in connected state.
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }

    /// Check if subscribed to a topic
    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.subscriptions.iter().any(|s| s == topic)
    }

    /// Get messages published to a specific topic
    pub fn published_to(&self, topic: &str) -> Vec<&(String, Vec<u8>, bool)> {
        self.published.iter().filter(|(t, _, _)| t == topic).collect()
    }
}

impl MqttClient for MockMqtt {
    type Error = &'static str;

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error> {
        if self.fail_publish || !self.connected {
            return Err("not connected");
        }
        self.published.push((topic.into(), payload.to_vec(), retain));
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error> {
        self.subscriptions.push(topic.into());
        Ok(())
    }
}

// ============================================================================
// Gateway Fakes
// ============================================================================

type MotorCalls = Arc<Mutex<Vec<(Direction, Speed)>>>;
type ShadowUpdates = Arc<Mutex<Vec<(Option<Direction>, Option<Speed>)>>>;

/// Recording [`MotorGateway`]. Clones share the same call log.
#[derive(Debug, Clone, Default)]
pub struct RecordingMotorGateway {
    calls: MotorCalls,
    fail: bool,
}

impl RecordingMotorGateway {
    /// Creates a recorder that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder whose calls fail after being recorded.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of the recorded calls.
    pub fn calls(&self) -> Vec<(Direction, Speed)> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl MotorGateway for RecordingMotorGateway {
    fn control(&mut self, direction: Direction, speed: Speed) -> Result<(), GatewayError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((direction, speed));
        if self.fail {
            return Err(GatewayError::Motor("recording motor set to fail".into()));
        }
        Ok(())
    }
}

/// Recording [`ShadowGateway`]. Clones share the same update log.
#[derive(Debug, Clone, Default)]
pub struct RecordingShadowGateway {
    updates: ShadowUpdates,
    fail: bool,
}

impl RecordingShadowGateway {
    /// Creates a recorder that accepts every update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder whose updates fail after being recorded.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of the recorded updates.
    pub fn updates(&self) -> Vec<(Option<Direction>, Option<Speed>)> {
        self.updates.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of recorded updates.
    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl ShadowGateway for RecordingShadowGateway {
    fn update(&mut self, direction: Option<Direction>, speed: Option<Speed>) -> Result<(), GatewayError> {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((direction, speed));
        if self.fail {
            return Err(GatewayError::Shadow("recording shadow set to fail".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
