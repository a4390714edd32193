//! Defines the top level configuration for the relayer.

use std::{path::Path, str::FromStr, time::Duration};

use alloy::primitives::Address;
use neo_apis::Uint160;
use tracing::Level;

/// The top level configuration for the relayer.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct RelayerConfig {
    /// The source chain.
    pub source: SourceConfig,
    /// The destination chain.
    pub destination: DestinationConfig,
    /// Where the destination signing key comes from.
    pub signer: SignerConfig,
    /// The range of source blocks to relay.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Logging and tracing.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// The prometheus endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// The source chain configuration.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct SourceConfig {
    /// JSON-RPC seed URLs, tried in order.
    pub seeds: Vec<String>,
    /// Script hash of the bridge contract, in display order.
    pub bridge_contract: Uint160,
    /// The block period in milliseconds.
    #[serde(default = "default_block_time_ms")]
    pub block_time_ms: u64,
}

/// The destination chain configuration.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct DestinationConfig {
    /// The EVM JSON-RPC URL.
    pub rpc_url: String,
    /// The bridge contract address.
    pub bridge_address: Address,
    /// The block period in milliseconds.
    #[serde(default = "default_block_time_ms")]
    pub block_time_ms: u64,
}

/// The signer configuration.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct SignerConfig {
    /// Name of the environment variable holding the hex private key.
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,
}

/// The block range to relay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct ScanConfig {
    /// The first block.
    #[serde(default)]
    pub start: u32,
    /// The block to stop before. Follows the chain when absent.
    #[serde(default)]
    pub end: Option<u32>,
}

/// The observability configuration.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct ObservabilityConfig {
    /// The log level.
    #[serde(default = "default_level")]
    pub level: String,
    /// Whether to export traces and logs over OTLP.
    #[serde(default)]
    pub use_otel: bool,
    /// The service name reported to the collector.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// The OTLP endpoint. The exporter default is used when absent.
    #[serde(default)]
    pub otel_endpoint: Option<String>,
}

/// The metrics server configuration.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct MetricsConfig {
    /// The address to bind to.
    #[serde(default = "default_metrics_address")]
    pub address: String,
    /// The port to bind to.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

const fn default_block_time_ms() -> u64 {
    15_000
}

fn default_private_key_env() -> String {
    "RELAYER_PRIVATE_KEY".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "bridge-relayer".to_string()
}

fn default_metrics_address() -> String {
    "0.0.0.0".to_string()
}

const fn default_metrics_port() -> u16 {
    9000
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            use_otel: false,
            service_name: default_service_name(),
            otel_endpoint: None,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            address: default_metrics_address(),
            port: default_metrics_port(),
        }
    }
}

impl ObservabilityConfig {
    /// Returns the log level, `INFO` if it cannot be parsed.
    #[must_use]
    pub fn level(&self) -> Level {
        Level::from_str(&self.level).unwrap_or(Level::INFO)
    }
}

impl SourceConfig {
    /// The block period.
    #[must_use]
    pub const fn block_time(&self) -> Duration {
        Duration::from_millis(self.block_time_ms)
    }
}

impl DestinationConfig {
    /// The block period.
    #[must_use]
    pub const fn block_time(&self) -> Duration {
        Duration::from_millis(self.block_time_ms)
    }
}

impl MetricsConfig {
    /// The socket address of the metrics server.
    ///
    /// # Errors
    /// Returns an error if the address or port is invalid.
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.address, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid metrics address: {e}"))
    }
}

impl RelayerConfig {
    /// Reads and parses the configuration file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`Self::validate`].
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {}: {e}", path.display()))?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        let config: Self = parse_config(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values serde cannot.
    ///
    /// # Errors
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.source.seeds.is_empty(),
            "config error at source.seeds: at least one seed is required"
        );
        anyhow::ensure!(
            self.source.block_time_ms > 0 && self.destination.block_time_ms > 0,
            "config error: block_time_ms must be positive"
        );
        if let Some(end) = self.scan.end {
            anyhow::ensure!(
                end > self.scan.start,
                "config error at scan.end: {end} is not after scan.start {}",
                self.scan.start
            );
        }
        Ok(())
    }
}

/// Parse a configuration value into the target struct while producing
/// detailed path-aware error messages.
///
/// # Errors
/// Returns an [`anyhow::Error`] with the precise path and the original serde
/// error message.
pub fn parse_config<T>(value: serde_json::Value) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let json_string = value.to_string();

    let mut deserializer = serde_json::Deserializer::from_str(&json_string);
    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(v) => Ok(v),
        Err(e) => Err(anyhow::anyhow!(format!(
            "config error at {}: {}",
            e.path(),
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn minimal() -> serde_json::Value {
        json!({
            "source": {
                "seeds": ["http://seed1:10332"],
                "bridge_contract": "0x49cf4e5378ffcd4dec034fd98a174c5491e395e2"
            },
            "destination": {
                "rpc_url": "http://side:8545",
                "bridge_address": "0x1212121212121212121212121212121212121212"
            },
            "signer": {}
        })
    }

    #[test]
    fn defaults_are_applied() {
        let config: RelayerConfig = parse_config(minimal()).unwrap();
        assert_eq!(config.source.block_time(), Duration::from_secs(15));
        assert_eq!(config.destination.block_time(), Duration::from_secs(15));
        assert_eq!(config.signer.private_key_env, "RELAYER_PRIVATE_KEY");
        assert_eq!(config.scan, ScanConfig::default());
        assert_eq!(config.observability.level(), Level::INFO);
        assert_eq!(config.metrics.port, 9000);
        assert_eq!(
            config.source.bridge_contract.to_string(),
            "0x49cf4e5378ffcd4dec034fd98a174c5491e395e2"
        );
        config.validate().unwrap();
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = ObservabilityConfig {
            level: "loud".to_string(),
            ..ObservabilityConfig::default()
        };
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn empty_seed_list_is_rejected() {
        let mut value = minimal();
        value["source"]["seeds"] = json!([]);
        let config: RelayerConfig = parse_config(value).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("source.seeds"), "{err}");
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut value = minimal();
        value["scan"] = json!({ "start": 10, "end": 10 });
        let config: RelayerConfig = parse_config(value).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn metrics_socket_addr() {
        let metrics = MetricsConfig {
            address: "127.0.0.1".to_string(),
            port: 9100,
        };
        assert_eq!(metrics.socket_addr().unwrap().port(), 9100);
        let bad = MetricsConfig {
            address: "not an address".to_string(),
            port: 1,
        };
        assert!(bad.socket_addr().is_err());
    }
}
