/// This script seeds the vaults of a forked network with test liquidity. It
/// expects the frontend to have deployed the vault system already and reads
/// the manager's address from the frontend's deployment manifest.
///
/// Every depositor approves and deposits:
///
/// - 1,000 USDC
/// - 78,000 USDT
/// - 9 WETH
/// - 4 WBTC
use eyre::Result;
use fill_vaults::{constants::ENV_FILE, fill_vaults, Chain, Config, ConfigurationError, FillError};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vault_addresses::Addresses;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // The manifest has to be in place before we touch the network.
    let config = Config::load(ENV_FILE).map_err(precondition)?;
    let addresses = Addresses::load(config.manifest_path())
        .map_err(|e| precondition(ConfigurationError::from(e)))?;
    info!(
        manager = ?addresses.manager,
        network = %config.network.name,
        depositors = config.depositors.len(),
        keys = config.keyring.len(),
        "loaded configuration"
    );

    let chain = Chain::connect(&config.network)
        .await?
        .with_keyring(config.keyring.clone());
    let summary = match fill_vaults(&chain, addresses.manager, &config.depositors).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("{e}");
            return Err(e.into());
        }
    };
    println!("{summary}");

    Ok(())
}

fn precondition(e: ConfigurationError) -> FillError {
    warn!("{e}, which is required for this script");
    e.into()
}
