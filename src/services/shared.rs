//! Unified shared state for all drive services.
//!
//! `SharedController` provides thread-safe access to a single
//! [`DriveController`] that can be shared between the web and shadow services.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use iotrain::controller::traced_controller;
//! use iotrain::gateways::{DisabledShadow, MotorDriverGateway};
//! use iotrain::hal::LogMotor;
//! use iotrain::services::{SharedController, StateProvider};
//! use iotrain::{FieldPolicy, Locomotive, SharedVehicle};
//! use serde_json::json;
//!
//! let vehicle = Arc::new(SharedVehicle::new(Locomotive::new()));
//! let controller = traced_controller(
//!     Arc::clone(&vehicle),
//!     MotorDriverGateway::new(LogMotor::new()),
//!     DisabledShadow,
//!     FieldPolicy::AllRequired,
//! );
//! let state = Arc::new(SharedController::new(controller, vehicle));
//!
//! let raw = json!({"direction": "FORWARD", "speed": 30});
//! state.operate(raw.as_object().unwrap()).unwrap();
//! assert_eq!(state.status().speed.value(), 30);
//! ```

use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

use crate::controller::DriveController;
use crate::error::OperationError;
use crate::traits::VehicleContext;
use crate::usecases::{OperateInputPort, OperateOutcome, StartInputPort};
use crate::vehicle::VehicleStatus;

// ============================================================================
// State Provider Trait
// ============================================================================

/// Trait for providing drive access to services.
///
/// Services (HTTP, MQTT) hold an `Arc<dyn StateProvider>` so they don't
/// depend on how the controller was wired.
pub trait StateProvider: Send + Sync {
    /// Current vehicle state.
    fn status(&self) -> VehicleStatus;

    /// Run the start-up report.
    fn start(&self) -> Result<VehicleStatus, OperationError>;

    /// Parse and apply a raw command mapping.
    fn operate(&self, raw: &Map<String, Value>) -> Result<OperateOutcome, OperationError>;
}

// ============================================================================
// Shared Controller
// ============================================================================

/// A [`DriveController`] behind a mutex, plus a read handle to its vehicle.
///
/// Every command runs parse, apply and both gateway calls under one lock.
/// Status reads go through the vehicle context and never wait on a command
/// in flight longer than its `operate` call.
pub struct SharedController<S, O, V> {
    controller: Mutex<DriveController<S, O>>,
    vehicle: V,
}

impl<S, O, V> SharedController<S, O, V>
where
    S: StartInputPort,
    O: OperateInputPort,
    V: VehicleContext,
{
    /// Wrap a controller and the context of the vehicle it drives.
    pub fn new(controller: DriveController<S, O>, vehicle: V) -> Self {
        Self {
            controller: Mutex::new(controller),
            vehicle,
        }
    }

    /// Access the controller with a mutable lock.
    ///
    /// The closure pattern prevents accidentally holding the lock across
    /// await points.
    pub fn with_controller<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut DriveController<S, O>) -> R,
    {
        let mut guard = self.controller.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<S, O, V> StateProvider for SharedController<S, O, V>
where
    S: StartInputPort + Send,
    O: OperateInputPort + Send,
    V: VehicleContext + Send + Sync,
{
    fn status(&self) -> VehicleStatus {
        self.vehicle.status()
    }

    fn start(&self) -> Result<VehicleStatus, OperationError> {
        self.with_controller(|controller| controller.start())
    }

    fn operate(&self, raw: &Map<String, Value>) -> Result<OperateOutcome, OperationError> {
        self.with_controller(|controller| controller.operate(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::traced_controller;
    use crate::hal::{RecordingMotorGateway, RecordingShadowGateway};
    use crate::traits::SharedVehicle;
    use crate::vehicle::{Drive, Locomotive, Vehicle};
    use crate::{Direction, FieldPolicy};
    use serde_json::json;
    use std::sync::Arc;

    fn shared<V: Vehicle + Send + 'static>(
        vehicle: V,
        policy: FieldPolicy,
    ) -> (Arc<dyn StateProvider>, RecordingMotorGateway, RecordingShadowGateway) {
        let context = Arc::new(SharedVehicle::new(vehicle));
        let motor = RecordingMotorGateway::new();
        let shadow = RecordingShadowGateway::new();
        let controller = traced_controller(Arc::clone(&context), motor.clone(), shadow.clone(), policy);
        (Arc::new(SharedController::new(controller, context)), motor, shadow)
    }

    #[test]
    fn status_reads_vehicle() {
        let (state, _, _) = shared(Locomotive::new(), FieldPolicy::AllRequired);
        assert_eq!(state.status(), VehicleStatus::default());
    }

    #[test]
    fn operate_through_provider() {
        let (state, motor, shadow) = shared(Drive::new(), FieldPolicy::PartialUpdate);

        let outcome = state.operate(json!({"direction": "BACKWARD"}).as_object().unwrap()).unwrap();

        assert!(outcome.is_changed());
        assert_eq!(state.status().direction, Direction::Backward);
        assert_eq!(motor.call_count(), 1);
        assert_eq!(shadow.update_count(), 1);
    }

    #[test]
    fn start_through_provider() {
        let (state, motor, shadow) = shared(Drive::new(), FieldPolicy::PartialUpdate);
        state.start().unwrap();
        assert_eq!(shadow.update_count(), 1);
        assert_eq!(motor.call_count(), 0);
    }

    #[test]
    fn with_controller_exposes_policy() {
        let context = Arc::new(SharedVehicle::new(Locomotive::new()));
        let controller = traced_controller(
            Arc::clone(&context),
            RecordingMotorGateway::new(),
            RecordingShadowGateway::new(),
            FieldPolicy::AllRequired,
        );
        let state = SharedController::new(controller, context);
        assert_eq!(state.with_controller(|c| c.policy()), FieldPolicy::AllRequired);
    }

    #[test]
    fn concurrent_commands() {
        use std::thread;

        let (state, motor, _) = shared(Drive::new(), FieldPolicy::PartialUpdate);

        let handles: Vec<_> = (1..=4)
            .map(|i| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    let raw = json!({"speed": i * 10});
                    state.operate(raw.as_object().unwrap()).unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // Every speed differs, so every command changed the drive.
        assert_eq!(motor.call_count(), 4);
    }
}
