//! Device shadow service over MQTT (mutual TLS).
//!
//! **Subscribe Topics:**
//! - `$aws/things/<thing>/shadow/update/delta` - desired changes
//!   `{"state": {"drive": {"direction": "FORWARD", "speed": 10}}, "version": 7}`
//!
//! **Publish Topics:**
//! - `$aws/things/<thing>/shadow/update` - reported state
//!   `{"state": {"reported": {"direction": "FORWARD", "speed": 10}}}`
//!
//! The event loop is async; commands are not. Each delta runs the whole
//! parse, apply and report sequence under the [`SharedController`] lock, and
//! the report is queued with `try_publish` so nothing awaits mid-command.
//!
//! [`SharedController`]: super::SharedController

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, TlsConfiguration, Transport};
use thiserror::Error;

use crate::config::ShadowConfig;
use crate::error::OperationError;
use crate::messages::ShadowDelta;
use crate::shadow::ShadowTopics;
use crate::traits::MqttClient;
use crate::usecases::OperateOutcome;

use super::shared::StateProvider;

/// Delay before polling again after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Capacity of the rumqttc request channel.
const REQUEST_CAPACITY: usize = 16;

// ============================================================================
// Configuration
// ============================================================================

/// Runtime shadow connection configuration for `rumqttc`.
///
/// Uses owned `String`/`PathBuf` values. Convert from the fixed-size
/// [`ShadowConfig`] with [`ShadowRuntimeConfig::from_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRuntimeConfig {
    /// Thing name
    pub thing_name: String,
    /// Endpoint hostname
    pub host: String,
    /// Endpoint port
    pub port: u16,
    /// Client ID
    pub client_id: String,
    /// Root CA certificate path
    pub root_ca_path: PathBuf,
    /// Device private key path
    pub private_key_path: PathBuf,
    /// Device certificate path
    pub certificate_path: PathBuf,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
}

impl ShadowRuntimeConfig {
    /// Create a config for `thing_name` at `host`, other fields default.
    pub fn new(thing_name: impl Into<String>, host: impl Into<String>) -> Self {
        let thing_name = thing_name.into();
        let defaults = ShadowConfig::default();
        Self {
            client_id: thing_name.clone(),
            thing_name,
            host: host.into(),
            port: defaults.port,
            root_ca_path: PathBuf::from(defaults.root_ca_path.as_str()),
            private_key_path: PathBuf::from(defaults.private_key_path.as_str()),
            certificate_path: PathBuf::from(defaults.certificate_path.as_str()),
            keep_alive_secs: defaults.keep_alive_secs,
        }
    }

    /// Create from shared ShadowConfig
    pub fn from_config(config: &ShadowConfig) -> Self {
        Self {
            thing_name: config.thing_name.as_str().to_string(),
            host: config.endpoint.as_str().to_string(),
            port: config.port,
            client_id: config.effective_client_id().to_string(),
            root_ca_path: PathBuf::from(config.root_ca_path.as_str()),
            private_key_path: PathBuf::from(config.private_key_path.as_str()),
            certificate_path: PathBuf::from(config.certificate_path.as_str()),
            keep_alive_secs: config.keep_alive_secs,
        }
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the credential file paths
    pub fn credentials(
        mut self,
        root_ca: impl Into<PathBuf>,
        private_key: impl Into<PathBuf>,
        certificate: impl Into<PathBuf>,
    ) -> Self {
        self.root_ca_path = root_ca.into();
        self.private_key_path = private_key.into();
        self.certificate_path = certificate.into();
        self
    }

    /// Shadow topics for the configured thing.
    pub fn topics(&self) -> ShadowTopics {
        ShadowTopics::new(&self.thing_name)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// MQTT-related errors
#[derive(Debug, Error)]
pub enum MqttError {
    /// The connection could not be set up
    #[error("failed to connect: {0}")]
    Connect(String),
    /// Failed to subscribe to topic
    #[error("failed to subscribe: {0}")]
    Subscribe(String),
    /// Failed to publish message
    #[error("failed to publish: {0}")]
    Publish(String),
    /// A credential file could not be read
    #[error("failed to read {path}: {source}")]
    Tls {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Client
// ============================================================================

/// [`MqttClient`] over a `rumqttc` [`AsyncClient`].
///
/// `publish` and `subscribe` enqueue without waiting. Incoming messages are
/// delivered by the event loop in [`ShadowHandler::run`].
#[derive(Clone, Debug)]
pub struct RumqttShadowClient {
    client: AsyncClient,
}

impl MqttClient for RumqttShadowClient {
    type Error = MqttError;

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), MqttError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, retain, payload.to_vec())
            .map_err(|e| MqttError::Publish(e.to_string()))
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), MqttError> {
        self.client
            .try_subscribe(topic, QoS::AtLeastOnce)
            .map_err(|e| MqttError::Subscribe(e.to_string()))
    }
}

fn read_credential(path: &Path) -> Result<Vec<u8>, MqttError> {
    std::fs::read(path).map_err(|source| MqttError::Tls {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the `rumqttc` options, loading the TLS credentials from disk.
pub fn mqtt_options(config: &ShadowRuntimeConfig) -> Result<MqttOptions, MqttError> {
    if config.thing_name.is_empty() || config.host.is_empty() {
        return Err(MqttError::Connect("thing name and endpoint are required".into()));
    }

    let tls = TlsConfiguration::Simple {
        ca: read_credential(&config.root_ca_path)?,
        alpn: None,
        client_auth: Some((
            read_credential(&config.certificate_path)?,
            read_credential(&config.private_key_path)?,
        )),
    };

    let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs as u64));
    options.set_transport(Transport::Tls(tls));
    Ok(options)
}

/// Create the client and its event loop. No network traffic happens until
/// the event loop is polled.
pub fn connect(config: &ShadowRuntimeConfig) -> Result<(RumqttShadowClient, EventLoop), MqttError> {
    let options = mqtt_options(config)?;
    let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
    Ok((RumqttShadowClient { client }, eventloop))
}

// ============================================================================
// Shadow Handler
// ============================================================================

/// Bridges shadow deltas to the drive.
pub struct ShadowHandler {
    topics: ShadowTopics,
    state: Arc<dyn StateProvider>,
    started: bool,
}

impl ShadowHandler {
    /// Handle deltas for the thing in `topics`.
    pub fn new(topics: ShadowTopics, state: Arc<dyn StateProvider>) -> Self {
        Self {
            topics,
            state,
            started: false,
        }
    }

    /// The shared drive state.
    pub fn state(&self) -> Arc<dyn StateProvider> {
        Arc::clone(&self.state)
    }

    /// Handle one incoming message.
    ///
    /// Returns `None` for messages on other topics, payloads that are not
    /// a JSON delta document, and deltas that carry no drive command.
    pub fn handle_message(
        &self,
        topic: &str,
        payload: &[u8],
    ) -> Option<Result<OperateOutcome, OperationError>> {
        if !self.topics.is_delta(topic) {
            tracing::trace!(topic, "ignoring message");
            return None;
        }

        let delta = match ShadowDelta::from_slice(payload) {
            Ok(delta) => delta,
            Err(e) => {
                tracing::warn!(topic, error = %e, "dropping malformed delta");
                return None;
            }
        };

        let Some(raw) = delta.drive_command() else {
            tracing::debug!(version = ?delta.version, "delta has no drive command");
            return None;
        };
        tracing::info!(version = ?delta.version, "delta received");
        Some(self.state.operate(raw))
    }

    /// Handle a new connection: subscribe to the delta topic, then send the
    /// start-up report if this is the first connection.
    ///
    /// A failed start-up report is logged, not returned, and is not retried.
    pub fn on_connect<C: MqttClient>(&mut self, mut client: C) -> Result<(), C::Error> {
        client.subscribe(self.topics.delta())?;
        tracing::info!(thing = self.topics.thing_name(), topic = self.topics.delta(), "shadow connected");

        if !self.started {
            self.started = true;
            if let Err(e) = self.state.start() {
                tracing::error!(error = %e, "start-up report failed");
            }
        }
        Ok(())
    }

    /// Drive the event loop until it is dropped.
    ///
    /// Resubscribes on every connection, and sends the start-up report after
    /// the first one.
    pub async fn run(mut self, mut client: RumqttShadowClient, mut eventloop: EventLoop) -> Result<(), MqttError> {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    self.on_connect(&mut client)?;
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if let Some(Err(e)) = self.handle_message(&publish.topic, &publish.payload) {
                        tracing::warn!(error = %e, "delta rejected");
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "shadow connection error");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }
}
