//! Defines the [`RelayerBuilder`] that assembles the relay loop from configuration.

use alloy::providers::RootProvider;
use bridge_relayer_lib::{
    chain::evm::{EvmDestination, LocalSigner},
    scanner::{Scanner, ScannerConfig},
};
use neo_apis::NeoRpcClient;
use tracing::{info, instrument};

use crate::config::RelayerConfig;

/// The relay loop over the production chain clients.
pub type BridgeScanner = Scanner<NeoRpcClient, EvmDestination<RootProvider>, LocalSigner>;

/// Builds and starts the relayer.
#[allow(clippy::module_name_repetitions)]
pub struct RelayerBuilder {
    config: RelayerConfig,
}

impl RelayerBuilder {
    /// A builder for `config`.
    #[must_use]
    pub const fn new(config: RelayerConfig) -> Self {
        Self { config }
    }

    /// Overrides the configured first block.
    #[must_use]
    pub fn start_at(mut self, start: u32) -> Self {
        self.config.scan.start = start;
        self
    }

    /// Overrides the configured end block.
    #[must_use]
    pub fn end_at(mut self, end: u32) -> Self {
        self.config.scan.end = Some(end);
        self
    }

    /// The configuration the relayer will run with.
    #[must_use]
    pub const fn config(&self) -> &RelayerConfig {
        &self.config
    }

    /// The parameters of the relay loop.
    #[must_use]
    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            bridge_contract: self.config.source.bridge_contract,
            bridge_address: self.config.destination.bridge_address,
            source_block_time: self.config.source.block_time(),
            destination_block_time: self.config.destination.block_time(),
            start: self.config.scan.start,
            end: self.config.scan.end,
        }
    }

    /// Loads the signing key from the configured environment variable.
    ///
    /// # Errors
    /// Returns an error if the variable is unset or not a valid key.
    pub fn signer(&self) -> anyhow::Result<LocalSigner> {
        let name = &self.config.signer.private_key_env;
        let key = std::env::var(name)
            .map_err(|e| anyhow::anyhow!("failed to read private key from {name}: {e}"))?;
        LocalSigner::from_hex(&key)
            .map_err(|e| anyhow::anyhow!("invalid private key in {name}: {e}"))
    }

    /// Connects to both chains and assembles the relay loop.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, the key cannot be
    /// loaded or the destination provider cannot be created.
    #[instrument(skip(self), err(Debug))]
    pub async fn build(self) -> anyhow::Result<BridgeScanner> {
        self.config.validate()?;
        let signer = self.signer()?;

        let source = NeoRpcClient::new(self.config.source.seeds.clone())?;
        let provider = RootProvider::connect(&self.config.destination.rpc_url)
            .await
            .map_err(|e| anyhow::anyhow!("failed to create provider: {e}"))?;

        info!(
            seeds = ?self.config.source.seeds,
            rpc_url = %self.config.destination.rpc_url,
            bridge = %self.config.destination.bridge_address,
            "chain clients created"
        );
        Ok(Scanner::new(
            source,
            EvmDestination::new(provider),
            signer,
            self.scanner_config(),
        ))
    }

    /// Builds the relay loop and runs it to the end of the range.
    ///
    /// # Errors
    /// Returns an error if building fails or the loop stops on a fatal error.
    #[instrument(skip(self), name = "relayer_start", err(Debug))]
    pub async fn start(self) -> anyhow::Result<()> {
        let mut scanner = self.build().await?;
        scanner.run().await?;
        info!("Relayer stopped");
        Ok(())
    }
}
