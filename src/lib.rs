//! # iotrain
//!
//! A drive controller for a model train, commanded through an IoT device
//! shadow or a small HTTP API.
//!
//! ## Features
//!
//! - **Validated commands**: untrusted JSON becomes a typed command or a list of errors
//! - **No-op suppression**: repeating the current state never reaches the motor or shadow
//! - **Gateway traits**: motor and shadow are swappable, with recording fakes for tests
//! - **Services**: device shadow over MQTT/TLS (`mqtt`), HTTP operate endpoint (`web`)
//!
//! ## Architecture
//!
//! - `motion` - Direction and bounded speed value types
//! - `vehicle` - Drive (with history) and Locomotive entities
//! - `commands` - Parsing raw mappings into operate commands
//! - `usecases` - Operate and start interactors
//! - `controller` - Parse-then-execute entry point for transports
//! - `traits` - Gateway, hardware and network abstractions
//! - `gateways` - Concrete motor and shadow gateways
//! - `hal` - Logging motor and mocks for testing
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use iotrain::controller::traced_controller;
//! use iotrain::gateways::MotorDriverGateway;
//! use iotrain::hal::{MockMotorDriver, RecordingShadowGateway};
//! use iotrain::{Direction, Drive, FieldPolicy, SharedVehicle, VehicleContext};
//! use serde_json::json;
//!
//! let drive = Arc::new(SharedVehicle::new(Drive::new()));
//! let shadow = RecordingShadowGateway::new();
//! let mut controller = traced_controller(
//!     Arc::clone(&drive),
//!     MotorDriverGateway::new(MockMotorDriver::new()),
//!     shadow.clone(),
//!     FieldPolicy::PartialUpdate,
//! );
//!
//! // Shadow deltas may carry either axis alone
//! controller.operate(json!({"direction": "FORWARD"}).as_object().unwrap()).unwrap();
//! controller.operate(json!({"speed": 40}).as_object().unwrap()).unwrap();
//!
//! assert_eq!(drive.status().direction, Direction::Forward);
//! assert_eq!(shadow.update_count(), 2);
//! ```

#![warn(missing_docs)]

/// Command parsing and validation.
pub mod commands;
/// Transport-facing controller.
pub mod controller;
/// Error types.
pub mod error;
/// Concrete motor and shadow gateways.
pub mod gateways;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Direction and speed value types.
pub mod motion;
/// Operate and start interactors.
pub mod usecases;
/// Core traits for gateways, hardware and networking.
pub mod traits;
/// Vehicle entities.
pub mod vehicle;

/// Application configuration.
pub mod config;

/// Wire types for the device shadow and HTTP API (serde-based).
pub mod messages;

/// Device shadow topic naming.
pub mod shadow;

/// Network services for HTTP API and MQTT (transports feature-gated).
pub mod services;

// Re-exports for convenience
pub use commands::{CommandResult, FieldPolicy, InvalidCommand, OperateCommand};
pub use controller::DriveController;
pub use error::{ConfigError, DirectionParseError, GatewayError, OperationError, SpeedRangeError};
pub use motion::{Direction, Speed};
pub use traits::{
    // Gateways
    MotorGateway,
    ShadowGateway,
    SharedVehicle,
    VehicleContext,
    // Hardware
    MotorDriver,
    // Network
    MqttClient,
};
pub use usecases::{OperateInputPort, OperateInteractor, OperateOutcome, StartInputPort, StartInteractor};
pub use vehicle::{Drive, DriveId, DriveState, Locomotive, StateId, Vehicle, VehicleStatus};

// Config re-exports
pub use config::{Config, DeviceConfig, ShadowConfig, WebConfig};
