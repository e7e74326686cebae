//! Transport-facing controller: parse a raw mapping, then execute.
//!
//! Transports hand the controller untrusted JSON. The controller applies
//! its [`FieldPolicy`] and forwards the result to the operate port, so
//! every transport shares one validation path.
//!
//! | Transport | Vehicle | Policy |
//! |-----------|---------|--------|
//! | Shadow delta | [`Drive`](crate::Drive) | [`FieldPolicy::PartialUpdate`] |
//! | HTTP operate | [`Locomotive`](crate::Locomotive) | [`FieldPolicy::AllRequired`] |

use serde_json::{Map, Value};

use crate::commands::{FieldPolicy, OperateCommand};
use crate::error::OperationError;
use crate::traits::{MotorGateway, ShadowGateway, VehicleContext};
use crate::usecases::{
    OperateInputPort, OperateInteractor, OperateOutcome, StartInputPort, StartInteractor, Traced,
};
use crate::vehicle::VehicleStatus;

/// Controller with both ports wrapped in [`Traced`].
pub type TracedController<C, M, S> =
    DriveController<Traced<StartInteractor<C, S>>, Traced<OperateInteractor<C, M, S>>>;

/// Wire a controller over one vehicle context, sharing `shadow` between the
/// start and operate ports.
pub fn traced_controller<C, M, S>(
    context: C,
    motor: M,
    shadow: S,
    policy: FieldPolicy,
) -> TracedController<C, M, S>
where
    C: VehicleContext + Clone,
    M: MotorGateway,
    S: ShadowGateway + Clone,
{
    DriveController::new(
        Traced::new("start", StartInteractor::new(context.clone(), shadow.clone())),
        Traced::new("operate", OperateInteractor::new(context, motor, shadow)),
        policy,
    )
}

/// Drives one vehicle from raw command mappings.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use iotrain::controller::DriveController;
/// use iotrain::hal::{RecordingMotorGateway, RecordingShadowGateway};
/// use iotrain::usecases::{OperateInteractor, StartInteractor};
/// use iotrain::{Drive, FieldPolicy, SharedVehicle};
/// use serde_json::json;
///
/// let drive = Arc::new(SharedVehicle::new(Drive::new()));
/// let shadow = RecordingShadowGateway::new();
/// let mut controller = DriveController::new(
///     StartInteractor::new(Arc::clone(&drive), shadow.clone()),
///     OperateInteractor::new(Arc::clone(&drive), RecordingMotorGateway::new(), shadow.clone()),
///     FieldPolicy::PartialUpdate,
/// );
///
/// controller.start().unwrap();
/// let outcome = controller.operate(json!({"speed": 20}).as_object().unwrap()).unwrap();
/// assert!(outcome.is_changed());
/// assert_eq!(shadow.update_count(), 2);
/// ```
#[derive(Debug)]
pub struct DriveController<S, O> {
    start: S,
    operate: O,
    policy: FieldPolicy,
}

impl<S: StartInputPort, O: OperateInputPort> DriveController<S, O> {
    /// Build a controller from its two ports and a parsing policy.
    pub fn new(start: S, operate: O, policy: FieldPolicy) -> Self {
        Self {
            start,
            operate,
            policy,
        }
    }

    /// The policy applied to incoming mappings.
    pub fn policy(&self) -> FieldPolicy {
        self.policy
    }

    /// Run the start-up report.
    pub fn start(&mut self) -> Result<VehicleStatus, OperationError> {
        self.start.execute()
    }

    /// Parse `raw` and apply it.
    pub fn operate(&mut self, raw: &Map<String, Value>) -> Result<OperateOutcome, OperationError> {
        let command = OperateCommand::from_map(raw, self.policy);
        self.operate.execute(command)
    }

    /// Like [`operate`](Self::operate), for a value that may not be an object.
    pub fn operate_value(&mut self, raw: &Value) -> Result<OperateOutcome, OperationError> {
        let command = OperateCommand::from_value(raw, self.policy);
        self.operate.execute(command)
    }
}
