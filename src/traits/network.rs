//! Network abstraction for the MQTT transport behind the device shadow.
//!
//! The shadow service is reached over MQTT:
//!
//! ```text
//! $aws/things/<thing>/shadow/update        - reported state (published)
//! $aws/things/<thing>/shadow/update/delta  - desired changes (subscribed)
//! ```
//!
//! [`MqttClient`] is kept synchronous so the drive pipeline never awaits
//! mid-command. Async transports implement it with non-blocking enqueue
//! calls (see `services::mqtt`).

/// MQTT client trait for pub/sub messaging.
///
/// Incoming messages are delivered by the transport's own event loop, so
/// the trait only covers the outgoing side.
///
/// # Implementation Notes
///
/// - `publish` and `subscribe` must not wait on the network
/// - The client should handle reconnection internally
pub trait MqttClient {
    /// Error type for MQTT operations.
    type Error: core::fmt::Debug;

    /// Publish a message to a topic.
    ///
    /// # Arguments
    /// - `topic`: MQTT topic path
    /// - `payload`: Message bytes
    /// - `retain`: If true, broker keeps message for new subscribers
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error>;

    /// Subscribe to a topic.
    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error>;
}

impl<C: MqttClient + ?Sized> MqttClient for &mut C {
    type Error = C::Error;

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error> {
        (**self).publish(topic, payload, retain)
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error> {
        (**self).subscribe(topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockMqtt;

    #[test]
    fn mutable_reference_forwards() {
        fn announce<C: MqttClient>(mut client: C) {
            client.subscribe("a/b").unwrap();
            client.publish("a/c", b"{}", true).unwrap();
        }

        let mut mqtt = MockMqtt::new();
        announce(&mut mqtt);
        assert!(mqtt.is_subscribed("a/b"));
        assert_eq!(mqtt.published_to("a/c").len(), 1);
    }
}
