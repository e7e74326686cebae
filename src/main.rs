//! iotrain entry point.
//!
//! ```text
//! iotrain shadow [THING_NAME] [-e ENDPOINT] [--port 8883] [-r CA] [-p KEY] [-c CERT]
//! iotrain serve [--addr 0.0.0.0:8080]
//! ```
//!
//! Settings come from the environment (see `iotrain::config`); flags given
//! on the command line take precedence.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use iotrain::config::{Config, ShadowConfig};
use iotrain::controller::traced_controller;
use iotrain::gateways::{DisabledShadow, MotorDriverGateway, MqttShadowGateway};
use iotrain::hal::LogMotor;
use iotrain::services::{
    connect, run_server, ShadowHandler, ShadowRuntimeConfig, SharedController, StateProvider,
    WebServerConfig,
};
use iotrain::{ConfigError, Drive, FieldPolicy, Locomotive, SharedVehicle};

/// Default log filter when neither `LOG_LEVEL` nor `RUST_LOG` is set.
const DEFAULT_FILTER: &str = "iotrain=debug";

#[derive(Debug, Parser)]
#[command(name = "iotrain", version, about = "Model train drive controller")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Follow the device shadow over MQTT
    Shadow(ShadowArgs),
    /// Serve the HTTP operate API
    Serve {
        /// Address to listen on [default: 0.0.0.0:$WEB_PORT]
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
}

#[derive(Debug, Default, clap::Args)]
struct ShadowArgs {
    /// Thing name registered with the shadow service [env: THING_NAME]
    thing_name: Option<String>,

    /// Endpoint host [env: ENDPOINT_HOST]
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Endpoint port [default: 8883]
    #[arg(long)]
    port: Option<u16>,

    /// Root CA certificate path [env: ROOT_CA_PATH]
    #[arg(short = 'r', long)]
    root_ca: Option<String>,

    /// Private key path [env: PRIVATE_KEY_PATH]
    #[arg(short = 'p', long)]
    private_key: Option<String>,

    /// Device certificate path [env: CERTIFICATE_PATH]
    #[arg(short = 'c', long)]
    certificate: Option<String>,
}

impl ShadowArgs {
    /// Overlay the flags that were given onto `shadow`.
    fn apply(&self, mut shadow: ShadowConfig) -> Result<ShadowConfig, ConfigError> {
        if let Some(name) = &self.thing_name {
            shadow = shadow.with_thing_name(name)?;
        }
        if let Some(host) = &self.endpoint {
            shadow = shadow.with_endpoint(host)?;
        }
        if let Some(port) = self.port {
            shadow = shadow.with_port(port);
        }
        if let Some(path) = &self.root_ca {
            shadow = shadow.with_root_ca_path(path)?;
        }
        if let Some(path) = &self.private_key {
            shadow = shadow.with_private_key_path(path)?;
        }
        if let Some(path) = &self.certificate {
            shadow = shadow.with_certificate_path(path)?;
        }
        Ok(shadow)
    }
}

fn web_server_config(config: &Config, addr: Option<SocketAddr>) -> WebServerConfig {
    match addr {
        Some(addr) => WebServerConfig::new(addr).cors(config.web.cors_permissive),
        None => WebServerConfig::from_config(&config.web),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run_shadow(config: &Config) -> anyhow::Result<()> {
    anyhow::ensure!(
        config.shadow.is_configured(),
        "thing name and endpoint are required (THING_NAME / ENDPOINT_HOST or command line)"
    );

    let runtime = ShadowRuntimeConfig::from_config(&config.shadow);
    let (client, eventloop) = connect(&runtime).context("failed to set up shadow client")?;

    let drive = Arc::new(SharedVehicle::new(Drive::new()));
    let controller = traced_controller(
        Arc::clone(&drive),
        MotorDriverGateway::new(LogMotor::new()),
        MqttShadowGateway::new(client.clone(), &runtime.thing_name),
        FieldPolicy::PartialUpdate,
    );
    let state: Arc<dyn StateProvider> = Arc::new(SharedController::new(controller, drive));

    tracing::info!(
        device = config.device.name.as_str(),
        thing = %runtime.thing_name,
        endpoint = %runtime.host,
        port = runtime.port,
        "connecting to device shadow"
    );

    let handler = ShadowHandler::new(runtime.topics(), state);
    tokio::select! {
        result = handler.run(client, eventloop) => result.context("shadow service stopped"),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}

async fn run_web(config: &Config, server: WebServerConfig) -> anyhow::Result<()> {
    let locomotive = Arc::new(SharedVehicle::new(Locomotive::new()));
    let controller = traced_controller(
        Arc::clone(&locomotive),
        MotorDriverGateway::new(LogMotor::new()),
        DisabledShadow,
        FieldPolicy::AllRequired,
    );
    let state: Arc<dyn StateProvider> = Arc::new(SharedController::new(controller, locomotive));

    tracing::info!(device = config.device.name.as_str(), addr = %server.addr, "starting web API");
    run_server(state, server).await.context("web server failed")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env().context("invalid configuration")?;

    match cli.command {
        Command::Shadow(args) => {
            let shadow = args.apply(config.shadow.clone()).context("invalid shadow option")?;
            run_shadow(&config.with_shadow(shadow)).await
        }
        Command::Serve { addr } => {
            let server = web_server_config(&config, addr);
            run_web(&config, server).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iotrain::config::{WebConfig, DEFAULT_ROOT_CA_PATH};

    fn shadow_args(argv: &[&str]) -> ShadowArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Shadow(args) => args,
            other => panic!("expected shadow command, got {other:?}"),
        }
    }

    #[test]
    fn flags_override_environment() {
        let from_env = ShadowConfig::default()
            .with_thing_name("env-thing")
            .and_then(|c| c.with_endpoint("env.host"))
            .unwrap();

        let args = shadow_args(&["iotrain", "shadow", "cli-thing", "--port", "443", "-c", "/tmp/cert.pem"]);
        let shadow = args.apply(from_env).unwrap();

        assert_eq!(shadow.thing_name.as_str(), "cli-thing");
        assert_eq!(shadow.endpoint.as_str(), "env.host");
        assert_eq!(shadow.port, 443);
        assert_eq!(shadow.certificate_path.as_str(), "/tmp/cert.pem");
        assert_eq!(shadow.root_ca_path.as_str(), DEFAULT_ROOT_CA_PATH);
    }

    #[test]
    fn no_flags_keeps_environment() {
        let from_env = ShadowConfig::default().with_thing_name("env-thing").unwrap();
        let shadow = ShadowArgs::default().apply(from_env.clone()).unwrap();
        assert_eq!(shadow, from_env);
    }

    #[test]
    fn oversized_flag_is_an_error() {
        let name = "t".repeat(200);
        let args = shadow_args(&["iotrain", "shadow", &name]);
        assert!(args.apply(ShadowConfig::default()).is_err());
    }

    #[test]
    fn serve_address_falls_back_to_web_port() {
        let config = Config::default().with_web(WebConfig::default().with_port(3000).with_cors(false));

        let server = web_server_config(&config, None);
        assert_eq!(server.addr, SocketAddr::from(([0, 0, 0, 0], 3000)));
        assert!(!server.cors_permissive);

        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(web_server_config(&config, Some(addr)).addr, addr);
    }
}
