//! Network provider setup

use alloy::{
    network::EthereumWallet,
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use crate::{
    config::Config,
    network::retry::{retry_with_backoff, RetryConfig},
    ConcreteProvider,
};

pub async fn setup_provider(config: &Config) -> Result<Arc<ConcreteProvider>> {
    let provider: Arc<ConcreteProvider> = Arc::new(
        ProviderBuilder::new()
            .on_http(config.rpc_url.parse().context("Invalid RPC_URL")?)
            .boxed()
    );

    info!("🔗 Testing connection to {}...", config.rpc_url);
    let block = retry_with_backoff(
        || async {
            provider.get_block_number().await
                .context("Failed to get block number")
        },
        &RetryConfig {
            max_attempts: 5,
            initial_delay_ms: 500,
            max_delay_ms: 10000,
            exponential_base: 2.0,
        },
        "RPC connection",
    ).await
    .map_err(|e| {
        warn!("⚠️ Network connection attempt failed: {}", e);
        anyhow::anyhow!("Network connection failed: {}", e)
    })?;

    info!("✅ Connected at block {}", block);
    Ok(provider)
}

/// Provider that fills nonce, gas and chain id and signs with the agent key.
pub fn setup_wallet_provider(
    provider: Arc<ConcreteProvider>,
    private_key: &str,
) -> Result<Arc<dyn Provider>> {
    let signer = PrivateKeySigner::from_str(private_key)
        .context("Failed to parse private key")?;
    let wallet = EthereumWallet::from(signer);

    let wallet_provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(wallet)
        .on_provider(provider.as_ref().clone());

    Ok(Arc::new(wallet_provider))
}
