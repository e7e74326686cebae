//! Stand-in motor for running without hardware attached.

use crate::traits::MotorDriver;

/// Motor driver that only logs the requested output.
///
/// Used by the binary when no motor board is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMotor {
    last: i8,
}

impl LogMotor {
    /// Creates a logging motor at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last output requested.
    pub fn last(&self) -> i8 {
        self.last
    }
}

impl MotorDriver for LogMotor {
    type Error = core::convert::Infallible;

    fn set_speed(&mut self, speed: i8) -> Result<(), Self::Error> {
        let speed = speed.clamp(-100, 100);
        tracing::info!(speed, previous = self.last, "motor output");
        self.last = speed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_motor_clamps() {
        let mut motor = LogMotor::new();
        motor.set_speed(-128).unwrap();
        assert_eq!(motor.last(), -100);

        motor.set_speed(42).unwrap();
        assert_eq!(motor.last(), 42);
    }
}
