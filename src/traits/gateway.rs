//! Capability contracts the interactors depend on.
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`MotorGateway`] | Drive the actuator with a direction and speed |
//! | [`ShadowGateway`] | Report state to the device shadow |
//! | [`VehicleContext`] | Scoped access to the vehicle owned by the application |
//!
//! Concrete gateways live in [`crate::gateways`]; recording fakes for tests
//! live in [`crate::hal::mock`].

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::GatewayError;
use crate::motion::{Direction, Speed};
use crate::vehicle::{Vehicle, VehicleStatus};

/// Drives the physical or simulated motor.
pub trait MotorGateway {
    /// Apply the given direction and speed to the actuator.
    fn control(&mut self, direction: Direction, speed: Speed) -> Result<(), GatewayError>;
}

/// Reports vehicle state to the shadow service.
pub trait ShadowGateway {
    /// Report the given axes. `None` axes are left out of the report, and
    /// nothing is sent when both are `None`.
    fn update(&mut self, direction: Option<Direction>, speed: Option<Speed>) -> Result<(), GatewayError>;
}

impl<G: MotorGateway + ?Sized> MotorGateway for Box<G> {
    fn control(&mut self, direction: Direction, speed: Speed) -> Result<(), GatewayError> {
        (**self).control(direction, speed)
    }
}

impl<G: ShadowGateway + ?Sized> ShadowGateway for Box<G> {
    fn update(&mut self, direction: Option<Direction>, speed: Option<Speed>) -> Result<(), GatewayError> {
        (**self).update(direction, speed)
    }
}

// ============================================================================
// Vehicle Context
// ============================================================================

/// Gives interactors access to a vehicle they do not own.
///
/// The closure pattern keeps the borrow (or lock) scoped to one call.
pub trait VehicleContext {
    /// The concrete vehicle type.
    type Vehicle: Vehicle;

    /// Run `f` with mutable access to the vehicle.
    fn with_vehicle<R>(&self, f: impl FnOnce(&mut Self::Vehicle) -> R) -> R;

    /// Snapshot of the vehicle's current pair.
    fn status(&self) -> VehicleStatus {
        self.with_vehicle(|vehicle| vehicle.status())
    }
}

impl<C: VehicleContext + ?Sized> VehicleContext for Arc<C> {
    type Vehicle = C::Vehicle;

    fn with_vehicle<R>(&self, f: impl FnOnce(&mut Self::Vehicle) -> R) -> R {
        (**self).with_vehicle(f)
    }
}

/// A vehicle behind a mutex, shareable between interactors and services.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use iotrain::{Drive, SharedVehicle, Vehicle, VehicleContext};
///
/// let context = Arc::new(SharedVehicle::new(Drive::new()));
/// let len = context.with_vehicle(|drive| drive.history().len());
/// assert_eq!(len, 1);
/// ```
#[derive(Debug, Default)]
pub struct SharedVehicle<V: Vehicle> {
    vehicle: Mutex<V>,
}

impl<V: Vehicle> SharedVehicle<V> {
    /// Take ownership of `vehicle`.
    pub fn new(vehicle: V) -> Self {
        Self {
            vehicle: Mutex::new(vehicle),
        }
    }

    /// Release the vehicle.
    pub fn into_inner(self) -> V {
        self.vehicle.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Vehicle> VehicleContext for SharedVehicle<V> {
    type Vehicle = V;

    fn with_vehicle<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        // Every vehicle mutation is a single assignment; poison carries no torn state.
        let mut guard = self.vehicle.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
