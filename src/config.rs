//! Application configuration.
//!
//! Uses `heapless::String` fields so configs are plain `Clone` values with a
//! fixed footprint. Builders follow the `with_*` convention; the ones taking
//! strings reject values that do not fit instead of cutting them short.
//!
//! # Example
//!
//! ```rust
//! use iotrain::config::{Config, ShadowConfig, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.shadow.port, 8883);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_shadow(
//!         ShadowConfig::default()
//!             .with_thing_name("iotrain-01")?
//!             .with_endpoint("abc123-ats.iot.ap-northeast-1.amazonaws.com")?,
//!     )
//!     .with_web(WebConfig::default().with_port(3000));
//! assert!(config.shadow.is_configured());
//! # Ok::<(), iotrain::ConfigError>(())
//! ```
//!
//! # Environment
//!
//! [`Config::from_env`] reads:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `THING_NAME` | `shadow.thing_name` |
//! | `ENDPOINT_HOST` | `shadow.endpoint` |
//! | `ROOT_CA_PATH` | `shadow.root_ca_path` |
//! | `PRIVATE_KEY_PATH` | `shadow.private_key_path` |
//! | `CERTIFICATE_PATH` | `shadow.certificate_path` |
//! | `WEB_PORT` | `web.port` |
//! | `DEVICE_NAME` | `device.name` |

use heapless::String as HString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Capacity of name fields (thing names, client IDs, device names).
///
/// Matches the longest thing name the shadow service accepts.
pub const MAX_NAME_LEN: usize = 128;

/// Capacity of host and file path fields.
pub const MAX_PATH_LEN: usize = 256;

/// Fixed-capacity name string.
pub type NameString = HString<MAX_NAME_LEN>;

/// Fixed-capacity host or path string.
pub type PathString = HString<MAX_PATH_LEN>;

/// Environment variable holding the thing name.
pub const ENV_THING_NAME: &str = "THING_NAME";
/// Environment variable holding the shadow endpoint host.
pub const ENV_ENDPOINT_HOST: &str = "ENDPOINT_HOST";
/// Environment variable holding the root CA path.
pub const ENV_ROOT_CA_PATH: &str = "ROOT_CA_PATH";
/// Environment variable holding the private key path.
pub const ENV_PRIVATE_KEY_PATH: &str = "PRIVATE_KEY_PATH";
/// Environment variable holding the client certificate path.
pub const ENV_CERTIFICATE_PATH: &str = "CERTIFICATE_PATH";
/// Environment variable holding the web server port.
pub const ENV_WEB_PORT: &str = "WEB_PORT";
/// Environment variable holding the device name.
pub const ENV_DEVICE_NAME: &str = "DEVICE_NAME";

/// Default root CA location.
pub const DEFAULT_ROOT_CA_PATH: &str = "./certs/AmazonRootCA1.pem";
/// Default private key location.
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "./certs/private.pem.key";
/// Default client certificate location.
pub const DEFAULT_CERTIFICATE_PATH: &str = "./certs/certificate.pem.crt";
/// Default device name.
pub const DEFAULT_DEVICE_NAME: &str = "iotrain";

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Copy `value` into a fixed-capacity string, or fail if it does not fit.
pub fn bounded<const N: usize>(field: &'static str, value: &str) -> Result<HString<N>, ConfigError> {
    let mut s = HString::new();
    s.push_str(value).map_err(|()| ConfigError::TooLong {
        field,
        len: value.len(),
        max: N,
    })?;
    Ok(s)
}

fn constant<const N: usize>(value: &'static str) -> HString<N> {
    // Only used for the defaults above, which are well under capacity.
    bounded("default", value).unwrap_or_default()
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Device shadow connection
    pub shadow: ShadowConfig,
    /// Web server configuration
    pub web: WebConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut web = WebConfig::default();
        if let Some(v) = lookup(ENV_WEB_PORT) {
            let port = v.parse().map_err(|_| ConfigError::Invalid {
                field: "web port",
                value: v.clone(),
            })?;
            web = web.with_port(port);
        }

        let mut device = DeviceConfig::default();
        if let Some(v) = lookup(ENV_DEVICE_NAME) {
            device = device.with_name(&v)?;
        }

        Ok(Self {
            shadow: ShadowConfig::from_lookup(&lookup)?,
            web,
            device,
        })
    }

    /// Set shadow configuration
    pub fn with_shadow(mut self, shadow: ShadowConfig) -> Self {
        self.shadow = shadow;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Shadow Config
// ============================================================================

/// Device shadow (MQTT over mutual TLS) configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowConfig {
    /// Thing name registered with the shadow service
    pub thing_name: NameString,
    /// Endpoint hostname
    pub endpoint: PathString,
    /// Endpoint port
    pub port: u16,
    /// Path to the root CA certificate (PEM)
    pub root_ca_path: PathString,
    /// Path to the device private key (PEM)
    pub private_key_path: PathString,
    /// Path to the device certificate (PEM)
    pub certificate_path: PathString,
    /// Client ID override (empty = use thing name)
    pub client_id: NameString,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            thing_name: NameString::new(),
            endpoint: PathString::new(),
            port: 8883,
            root_ca_path: constant(DEFAULT_ROOT_CA_PATH),
            private_key_path: constant(DEFAULT_PRIVATE_KEY_PATH),
            certificate_path: constant(DEFAULT_CERTIFICATE_PATH),
            client_id: NameString::new(),
            keep_alive_secs: 30,
        }
    }
}

impl ShadowConfig {
    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(v) = lookup(ENV_THING_NAME) {
            config = config.with_thing_name(&v)?;
        }
        if let Some(v) = lookup(ENV_ENDPOINT_HOST) {
            config = config.with_endpoint(&v)?;
        }
        if let Some(v) = lookup(ENV_ROOT_CA_PATH) {
            config = config.with_root_ca_path(&v)?;
        }
        if let Some(v) = lookup(ENV_PRIVATE_KEY_PATH) {
            config = config.with_private_key_path(&v)?;
        }
        if let Some(v) = lookup(ENV_CERTIFICATE_PATH) {
            config = config.with_certificate_path(&v)?;
        }
        Ok(config)
    }

    /// Set the thing name
    pub fn with_thing_name(mut self, name: &str) -> Result<Self, ConfigError> {
        self.thing_name = bounded("thing_name", name)?;
        Ok(self)
    }

    /// Set the endpoint host
    pub fn with_endpoint(mut self, host: &str) -> Result<Self, ConfigError> {
        self.endpoint = bounded("endpoint", host)?;
        Ok(self)
    }

    /// Set the endpoint port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the root CA path
    pub fn with_root_ca_path(mut self, path: &str) -> Result<Self, ConfigError> {
        self.root_ca_path = bounded("root_ca_path", path)?;
        Ok(self)
    }

    /// Set the private key path
    pub fn with_private_key_path(mut self, path: &str) -> Result<Self, ConfigError> {
        self.private_key_path = bounded("private_key_path", path)?;
        Ok(self)
    }

    /// Set the certificate path
    pub fn with_certificate_path(mut self, path: &str) -> Result<Self, ConfigError> {
        self.certificate_path = bounded("certificate_path", path)?;
        Ok(self)
    }

    /// Set the root CA, private key and certificate paths
    pub fn with_credentials(self, root_ca: &str, private_key: &str, certificate: &str) -> Result<Self, ConfigError> {
        self.with_root_ca_path(root_ca)?
            .with_private_key_path(private_key)?
            .with_certificate_path(certificate)
    }

    /// Set the client ID
    pub fn with_client_id(mut self, id: &str) -> Result<Self, ConfigError> {
        self.client_id = bounded("client_id", id)?;
        Ok(self)
    }

    /// Set the keep-alive interval
    pub fn with_keep_alive_secs(mut self, secs: u16) -> Self {
        self.keep_alive_secs = secs;
        self
    }

    /// Client ID to connect with
    pub fn effective_client_id(&self) -> &str {
        if self.client_id.is_empty() {
            self.thing_name.as_str()
        } else {
            self.client_id.as_str()
        }
    }

    /// Check if a thing name and endpoint are set
    pub fn is_configured(&self) -> bool {
        !self.thing_name.is_empty() && !self.endpoint.is_empty()
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_permissive: true,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: NameString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: constant(DEFAULT_DEVICE_NAME),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Result<Self, ConfigError> {
        self.name = bounded("device name", name)?;
        Ok(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shadow::ShadowTopics;
    use std::collections::HashMap;

    fn lookup<'a>(env: &'a HashMap<&str, &str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| env.get(key).map(|v| v.to_string())
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.shadow.port, 8883);
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.device.name.as_str(), "iotrain");
        assert!(!config.shadow.is_configured());
    }

    #[test]
    fn shadow_default_credentials() {
        let shadow = ShadowConfig::default();
        assert_eq!(shadow.root_ca_path.as_str(), "./certs/AmazonRootCA1.pem");
        assert_eq!(shadow.private_key_path.as_str(), "./certs/private.pem.key");
        assert_eq!(shadow.certificate_path.as_str(), "./certs/certificate.pem.crt");
        assert_eq!(shadow.keep_alive_secs, 30);
    }

    #[test]
    fn shadow_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("THING_NAME", "iotrain-01"),
            ("ENDPOINT_HOST", "example-ats.iot.us-east-1.amazonaws.com"),
            ("CERTIFICATE_PATH", "/etc/iotrain/cert.pem"),
        ]
        .into_iter()
        .collect();

        let shadow = ShadowConfig::from_lookup(lookup(&env)).unwrap();

        assert_eq!(shadow.thing_name.as_str(), "iotrain-01");
        assert_eq!(shadow.endpoint.as_str(), "example-ats.iot.us-east-1.amazonaws.com");
        assert_eq!(shadow.certificate_path.as_str(), "/etc/iotrain/cert.pem");
        // Unset variables keep their defaults.
        assert_eq!(shadow.root_ca_path.as_str(), DEFAULT_ROOT_CA_PATH);
        assert!(shadow.is_configured());
    }

    #[test]
    fn from_empty_lookup_is_default() {
        assert_eq!(ShadowConfig::from_lookup(|_| None).unwrap(), ShadowConfig::default());
        assert_eq!(Config::from_lookup(|_| None).unwrap(), Config::default());
    }

    #[test]
    fn config_from_lookup_reads_web_and_device() {
        let env: HashMap<&str, &str> = [("WEB_PORT", "3000"), ("DEVICE_NAME", "yard"), ("THING_NAME", "loco")]
            .into_iter()
            .collect();

        let config = Config::from_lookup(lookup(&env)).unwrap();

        assert_eq!(config.web.port, 3000);
        assert_eq!(config.device.name.as_str(), "yard");
        assert_eq!(config.shadow.thing_name.as_str(), "loco");
    }

    #[test]
    fn config_from_lookup_rejects_bad_port() {
        let env: HashMap<&str, &str> = [("WEB_PORT", "eighty")].into_iter().collect();

        assert_eq!(
            Config::from_lookup(lookup(&env)),
            Err(ConfigError::Invalid {
                field: "web port",
                value: "eighty".into()
            })
        );
    }

    #[test]
    fn shadow_client_id_falls_back_to_thing_name() {
        let shadow = ShadowConfig::default().with_thing_name("train").unwrap();
        assert_eq!(shadow.effective_client_id(), "train");

        let shadow = shadow.with_client_id("train-dev").unwrap();
        assert_eq!(shadow.effective_client_id(), "train-dev");
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_shadow(
                ShadowConfig::default()
                    .with_thing_name("loco")
                    .and_then(|s| s.with_endpoint("broker.local"))
                    .and_then(|s| s.with_credentials("ca.pem", "key.pem", "cert.pem"))
                    .unwrap()
                    .with_port(443)
                    .with_keep_alive_secs(60),
            )
            .with_web(WebConfig::default().with_port(3000).with_cors(false))
            .with_device(DeviceConfig::default().with_name("My Train").unwrap());

        assert_eq!(config.shadow.endpoint.as_str(), "broker.local");
        assert_eq!(config.shadow.port, 443);
        assert_eq!(config.shadow.private_key_path.as_str(), "key.pem");
        assert_eq!(config.shadow.keep_alive_secs, 60);
        assert_eq!(config.web.port, 3000);
        assert!(!config.web.cors_permissive);
        assert_eq!(config.device.name.as_str(), "My Train");
    }

    #[test]
    fn web_config_default() {
        let web = WebConfig::default();
        assert_eq!(web.port, 8080);
        assert!(web.cors_permissive);
    }

    // =========================================================================
    // Capacity Tests
    // =========================================================================

    #[test]
    fn long_thing_name_is_kept_whole() {
        let name = "t".repeat(100);
        let shadow = ShadowConfig::default().with_thing_name(&name).unwrap();

        assert_eq!(shadow.thing_name.as_str(), name);
        let topics = ShadowTopics::new(&shadow.thing_name);
        assert_eq!(topics.delta(), format!("$aws/things/{name}/shadow/update/delta"));
    }

    #[test]
    fn long_credential_path_is_kept_whole() {
        let path = format!("/srv/{}/cert.pem", "c".repeat(140));
        assert_eq!(path.len(), 154);

        let shadow = ShadowConfig::default()
            .with_credentials(DEFAULT_ROOT_CA_PATH, DEFAULT_PRIVATE_KEY_PATH, &path)
            .unwrap();
        assert_eq!(shadow.certificate_path.as_str(), path);
    }

    #[test]
    fn oversized_values_are_rejected() {
        let err = ShadowConfig::default()
            .with_thing_name(&"t".repeat(MAX_NAME_LEN + 1))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooLong {
                field: "thing_name",
                len: 129,
                max: 128
            }
        );

        let err = ShadowConfig::default()
            .with_certificate_path(&"p".repeat(300))
            .unwrap_err();
        assert!(matches!(err, ConfigError::TooLong { field: "certificate_path", .. }));
    }

    #[test]
    fn oversized_env_value_fails_lookup() {
        let long = "e".repeat(MAX_PATH_LEN + 10);
        let env: HashMap<&str, &str> = [("ENDPOINT_HOST", long.as_str())].into_iter().collect();

        let err = Config::from_lookup(lookup(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::TooLong { field: "endpoint", .. }));
    }

    #[test]
    fn multibyte_value_at_capacity() {
        // 32 four-byte characters fill a name field exactly; one more does not fit.
        let name = "\u{1F682}".repeat(32);
        assert_eq!(bounded::<MAX_NAME_LEN>("name", &name).unwrap().as_str(), name);
        assert!(bounded::<MAX_NAME_LEN>("name", &format!("{name}x")).is_err());
    }
}
