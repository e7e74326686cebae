//! Hardware abstraction for the motor peripheral.
//!
//! The drive only needs one capability from the hardware: setting a signed
//! output. Positive values drive forward, negative values reverse, zero stops.
//!
//! # Example
//!
//! ```rust
//! use iotrain::traits::MotorDriver;
//! use iotrain::hal::MockMotorDriver;
//!
//! let mut motor = MockMotorDriver::new();
//! motor.set_speed(-40).unwrap();
//! assert_eq!(motor.speed, -40);
//!
//! motor.stop().unwrap();
//! assert_eq!(motor.speed, 0);
//! ```

/// Signed-speed motor driver.
///
/// Implement this for your motor controller board. Values are in
/// `-100..=100`; implementations should clamp anything outside that range.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use iotrain::traits::MotorDriver;
///
/// struct HBridge { /* pwm + direction pins */ }
///
/// impl MotorDriver for HBridge {
///     type Error = ();
///
///     fn set_speed(&mut self, speed: i8) -> Result<(), ()> {
///         let duty = speed.unsigned_abs().min(100);
///         // Set polarity from the sign, PWM from `duty`...
///         Ok(())
///     }
/// }
/// ```
pub trait MotorDriver {
    /// Error type for motor operations.
    type Error: core::fmt::Debug;

    /// Set the signed output, `-100..=100`.
    fn set_speed(&mut self, speed: i8) -> Result<(), Self::Error>;

    /// Convenience method to stop the motor.
    fn stop(&mut self) -> Result<(), Self::Error> {
        self.set_speed(0)
    }
}

impl<M: MotorDriver + ?Sized> MotorDriver for &mut M {
    type Error = M::Error;

    fn set_speed(&mut self, speed: i8) -> Result<(), Self::Error> {
        (**self).set_speed(speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestMotor {
        speed: i8,
        calls: usize,
    }

    impl MotorDriver for TestMotor {
        type Error = ();

        fn set_speed(&mut self, speed: i8) -> Result<(), ()> {
            self.speed = speed;
            self.calls += 1;
            Ok(())
        }
    }

    #[test]
    fn stop_default_impl() {
        let mut motor = TestMotor::default();
        motor.set_speed(60).unwrap();
        motor.stop().unwrap();

        assert_eq!(motor.speed, 0);
        assert_eq!(motor.calls, 2);
    }

    #[test]
    fn mutable_reference_forwards() {
        fn reverse<M: MotorDriver>(mut motor: M) {
            motor.set_speed(-25).unwrap();
        }

        let mut motor = TestMotor::default();
        reverse(&mut motor);
        assert_eq!(motor.speed, -25);
    }
}
