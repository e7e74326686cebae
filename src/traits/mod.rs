//! Trait definitions for gateways, hardware and networking.
//!
//! # Submodules
//!
//! - `gateway`: Motor and shadow gateway contracts, vehicle context
//! - `hardware`: Signed-speed motor driver
//! - `network`: MQTT client used to reach the device shadow
//!
//! Interactors depend only on [`MotorGateway`], [`ShadowGateway`] and
//! [`VehicleContext`]. The concrete gateways in [`crate::gateways`] are in
//! turn written against [`MotorDriver`] and [`MqttClient`], so every layer
//! can be replaced with a mock from [`crate::hal`].

pub mod gateway;
pub mod hardware;
pub mod network;

pub use gateway::*;
pub use hardware::*;
pub use network::*;
