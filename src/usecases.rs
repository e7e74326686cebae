//! Interactors: the operate and start use cases.
//!
//! An interactor owns its gateways and reaches the vehicle through a
//! [`VehicleContext`]. The sequence for an operate command is:
//!
//! ```text
//! command ──► invalid? ──yes──► Err(InvalidCommand)         (no side effects)
//!                │
//!                no
//!                ▼
//!        vehicle.operate ──false──► Ok(Unchanged)           (no side effects)
//!                │
//!               true
//!                ▼
//!        motor.control(current) ──► shadow.update(current) ──► Ok(Changed)
//! ```
//!
//! A failing gateway aborts the sequence with [`OperationError::Gateway`].
//! The vehicle keeps its new state.

use crate::commands::{CommandResult, OperateCommand};
use crate::error::OperationError;
use crate::traits::{MotorGateway, ShadowGateway, VehicleContext};
use crate::vehicle::{Vehicle, VehicleStatus};

// ============================================================================
// Input Ports
// ============================================================================

/// Entry point for operate commands.
pub trait OperateInputPort {
    /// Apply a parsed command.
    fn execute(&mut self, command: CommandResult) -> Result<OperateOutcome, OperationError>;
}

/// Entry point for the start-up report.
pub trait StartInputPort {
    /// Report the vehicle's current state.
    fn execute(&mut self) -> Result<VehicleStatus, OperationError>;
}

/// Result of a successful operate command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperateOutcome {
    /// The vehicle moved to a new state and the gateways were told.
    Changed(VehicleStatus),
    /// The command matched the current state. Nothing was sent.
    Unchanged(VehicleStatus),
}

impl OperateOutcome {
    /// The vehicle state after the command.
    pub fn status(&self) -> VehicleStatus {
        match *self {
            Self::Changed(status) | Self::Unchanged(status) => status,
        }
    }

    /// Returns true if the command changed the vehicle.
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

// ============================================================================
// Operate
// ============================================================================

/// Applies operate commands to a vehicle and notifies the gateways.
#[derive(Debug)]
pub struct OperateInteractor<C, M, S> {
    context: C,
    motor: M,
    shadow: S,
}

impl<C, M, S> OperateInteractor<C, M, S>
where
    C: VehicleContext,
    M: MotorGateway,
    S: ShadowGateway,
{
    /// Build an interactor over the given context and gateways.
    pub fn new(context: C, motor: M, shadow: S) -> Self {
        Self { context, motor, shadow }
    }

    /// The vehicle context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// The motor gateway.
    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// The shadow gateway.
    pub fn shadow(&self) -> &S {
        &self.shadow
    }

    fn apply(&mut self, command: OperateCommand) -> Result<OperateOutcome, OperationError> {
        let (changed, status) = self.context.with_vehicle(|vehicle| {
            let changed = vehicle.operate(command.direction, command.speed);
            (changed, vehicle.status())
        });

        if !changed {
            return Ok(OperateOutcome::Unchanged(status));
        }

        self.motor.control(status.direction, status.speed)?;
        self.shadow.update(Some(status.direction), Some(status.speed))?;
        Ok(OperateOutcome::Changed(status))
    }
}

impl<C, M, S> OperateInputPort for OperateInteractor<C, M, S>
where
    C: VehicleContext,
    M: MotorGateway,
    S: ShadowGateway,
{
    fn execute(&mut self, command: CommandResult) -> Result<OperateOutcome, OperationError> {
        let command = command.map_err(OperationError::InvalidCommand)?;
        self.apply(command)
    }
}

// ============================================================================
// Start
// ============================================================================

/// Reports the vehicle's state once, at start-up.
#[derive(Debug)]
pub struct StartInteractor<C, S> {
    context: C,
    shadow: S,
}

impl<C: VehicleContext, S: ShadowGateway> StartInteractor<C, S> {
    /// Build a start interactor.
    pub fn new(context: C, shadow: S) -> Self {
        Self { context, shadow }
    }

    /// The shadow gateway.
    pub fn shadow(&self) -> &S {
        &self.shadow
    }
}

impl<C: VehicleContext, S: ShadowGateway> StartInputPort for StartInteractor<C, S> {
    fn execute(&mut self) -> Result<VehicleStatus, OperationError> {
        let status = self.context.status();
        self.shadow.update(Some(status.direction), Some(status.speed))?;
        Ok(status)
    }
}

// ============================================================================
// Tracing
// ============================================================================

/// Logs every call passing through an input port.
///
/// One debug event on entry, and one on exit: debug on success, warn on
/// failure.
#[derive(Debug)]
pub struct Traced<P> {
    name: &'static str,
    inner: P,
}

impl<P> Traced<P> {
    /// Wrap `inner`, tagging events with `name`.
    pub fn new(name: &'static str, inner: P) -> Self {
        Self { name, inner }
    }

    /// The wrapped port.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Unwrap the port.
    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: OperateInputPort> OperateInputPort for Traced<P> {
    fn execute(&mut self, command: CommandResult) -> Result<OperateOutcome, OperationError> {
        match &command {
            Ok(cmd) => tracing::debug!(port = self.name, command = %cmd, "execute"),
            Err(invalid) => tracing::debug!(port = self.name, command = %invalid, "execute"),
        }

        let result = self.inner.execute(command);
        match &result {
            Ok(outcome) => tracing::debug!(
                port = self.name,
                changed = outcome.is_changed(),
                direction = %outcome.status().direction,
                speed = %outcome.status().speed,
                "done"
            ),
            Err(e) => tracing::warn!(port = self.name, error = %e, "failed"),
        }
        result
    }
}

impl<P: StartInputPort> StartInputPort for Traced<P> {
    fn execute(&mut self) -> Result<VehicleStatus, OperationError> {
        tracing::debug!(port = self.name, "execute");

        let result = self.inner.execute();
        match &result {
            Ok(status) => tracing::debug!(
                port = self.name,
                direction = %status.direction,
                speed = %status.speed,
                "done"
            ),
            Err(e) => tracing::warn!(port = self.name, error = %e, "failed"),
        }
        result
    }
}
