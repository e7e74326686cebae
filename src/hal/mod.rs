//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `dummy`: Logging motor for running without hardware
//! - `mock`: Test implementations for desktop development

pub mod dummy;
pub mod mock;

pub use dummy::*;
pub use mock::*;
