//! Network services for the HTTP API and the device shadow.
//!
//! - `web` feature: Axum-based HTTP API server with JSON endpoints
//! - `mqtt` feature: device shadow client over MQTT with mutual TLS
//!
//! Both services drive the vehicle through an `Arc<dyn StateProvider>`,
//! normally a [`SharedController`]:
//!
//! ```ignore
//! let state: Arc<dyn StateProvider> = Arc::new(SharedController::new(controller, vehicle));
//!
//! let web_router = build_router(Arc::clone(&state), &web_config);
//! let shadow = ShadowHandler::new(topics, Arc::clone(&state));
//! ```

pub mod shared;

#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "mqtt")]
pub mod mqtt;

pub use shared::*;

#[cfg(feature = "web")]
pub use web::*;

#[cfg(feature = "mqtt")]
pub use mqtt::*;
