//! Concrete gateways wiring the interactors to hardware and transport.
//!
//! | Gateway | Implements | Backed by |
//! |---------|------------|-----------|
//! | [`MotorDriverGateway`] | [`MotorGateway`] | any [`MotorDriver`] |
//! | [`MqttShadowGateway`] | [`ShadowGateway`] | any [`MqttClient`] |
//! | [`DisabledShadow`] | [`ShadowGateway`] | nothing (no shadow service) |

use crate::error::GatewayError;
use crate::messages::ShadowReport;
use crate::motion::{Direction, Speed};
use crate::shadow::ShadowTopics;
use crate::traits::{MotorDriver, MotorGateway, MqttClient, ShadowGateway};

// ============================================================================
// Motor
// ============================================================================

/// Signed motor output for a direction and speed.
///
/// Forward is positive, backward negative, stop is always zero.
pub fn signed_output(direction: Direction, speed: Speed) -> i8 {
    // Speed is at most 100, so it always fits in an i8.
    let magnitude = speed.value() as i8;
    match direction {
        Direction::Forward => magnitude,
        Direction::Backward => -magnitude,
        Direction::Stop => 0,
    }
}

/// [`MotorGateway`] over a signed-speed [`MotorDriver`].
///
/// # Example
///
/// ```rust
/// use iotrain::gateways::MotorDriverGateway;
/// use iotrain::hal::MockMotorDriver;
/// use iotrain::traits::MotorGateway;
/// use iotrain::{Direction, Speed};
///
/// let mut gateway = MotorDriverGateway::new(MockMotorDriver::new());
/// gateway.control(Direction::Backward, Speed::new(30).unwrap()).unwrap();
/// assert_eq!(gateway.driver().speed, -30);
/// ```
#[derive(Debug, Default)]
pub struct MotorDriverGateway<M: MotorDriver> {
    driver: M,
}

impl<M: MotorDriver> MotorDriverGateway<M> {
    /// Wrap a motor driver.
    pub fn new(driver: M) -> Self {
        Self { driver }
    }

    /// Access the underlying driver.
    pub fn driver(&self) -> &M {
        &self.driver
    }

    /// Release the underlying driver.
    pub fn into_inner(self) -> M {
        self.driver
    }
}

impl<M: MotorDriver> MotorGateway for MotorDriverGateway<M> {
    fn control(&mut self, direction: Direction, speed: Speed) -> Result<(), GatewayError> {
        let output = signed_output(direction, speed);
        self.driver
            .set_speed(output)
            .map_err(|e| GatewayError::Motor(format!("{e:?}")))
    }
}

// ============================================================================
// Shadow
// ============================================================================

/// [`ShadowGateway`] publishing sparse reports over MQTT.
///
/// Reports go to `$aws/things/<thing>/shadow/update`, not retained.
#[derive(Debug, Clone)]
pub struct MqttShadowGateway<C: MqttClient> {
    client: C,
    topics: ShadowTopics,
}

impl<C: MqttClient> MqttShadowGateway<C> {
    /// Publish through `client` on behalf of `thing_name`.
    pub fn new(client: C, thing_name: &str) -> Self {
        Self {
            client,
            topics: ShadowTopics::new(thing_name),
        }
    }

    /// Shadow topics for this thing.
    pub fn topics(&self) -> &ShadowTopics {
        &self.topics
    }

    /// Access the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: MqttClient> ShadowGateway for MqttShadowGateway<C> {
    fn update(&mut self, direction: Option<Direction>, speed: Option<Speed>) -> Result<(), GatewayError> {
        let report = ShadowReport::new(direction, speed);
        if report.is_empty() {
            return Ok(());
        }

        let payload = serde_json::to_vec(&report)?;
        self.client
            .publish(self.topics.update(), &payload, false)
            .map_err(|e| GatewayError::Shadow(format!("{e:?}")))
    }
}

/// [`ShadowGateway`] used when no shadow service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledShadow;

impl ShadowGateway for DisabledShadow {
    fn update(&mut self, direction: Option<Direction>, speed: Option<Speed>) -> Result<(), GatewayError> {
        tracing::trace!(?direction, ?speed, "shadow disabled, report dropped");
        Ok(())
    }
}
