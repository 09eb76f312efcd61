mod options;
mod vault_chain;

use std::{any::Any, sync::Arc, time::Duration};

use ethers::{
    core::utils::Anvil,
    providers::{Http, Middleware, Provider},
    utils::AnvilInstance,
};
use tokio::process::Command;
use tracing::info;

pub use options::CallOptions;
pub use vault_chain::{LocalClient, NodeSigner, VaultChain};

use crate::{
    config::{Keyring, NetworkConfig, Rpc},
    error::{ConfigurationError, FillError},
};

/// The flavor of node behind the RPC URL. Anvil and hardhat nodes can
/// impersonate arbitrary accounts; on other nodes the depositors' writes are
/// signed with keys from the keyring.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum NodeKind {
    Anvil,
    Hardhat,
    Other,
}

impl NodeKind {
    fn from_client_version(client_version: &str) -> Self {
        if client_version.contains("anvil") {
            NodeKind::Anvil
        } else if client_version.contains("HardhatNetwork") {
            NodeKind::Hardhat
        } else {
            NodeKind::Other
        }
    }

    pub(crate) fn impersonate_method(self) -> Option<&'static str> {
        match self {
            NodeKind::Anvil => Some("anvil_impersonateAccount"),
            NodeKind::Hardhat => Some("hardhat_impersonateAccount"),
            NodeKind::Other => None,
        }
    }
}

/// A connection to the network that the vaults are deployed on. If the
/// network is a fork, the chain owns the anvil node that serves it.
pub struct Chain {
    provider: Arc<Provider<Http>>,
    chain_id: u64,
    kind: NodeKind,
    keyring: Keyring,
    _maybe_anvil: Option<AnvilInstance>,
}

impl Chain {
    /// Connects to the configured network. Fork networks spin up a local
    /// anvil node that forks the upstream RPC.
    pub async fn connect(network: &NetworkConfig) -> Result<Self, FillError> {
        match &network.rpc {
            Rpc::Remote { url } => {
                info!(network = %network.name, %url, "connecting to remote node");
                Self::with_endpoint(network, url, None).await
            }
            Rpc::Fork { fork_url } => {
                info!(network = %network.name, %fork_url, "spawning forked anvil node");
                let anvil = spawn_fork(fork_url, network.chain_id).await?;
                let endpoint = anvil.endpoint();
                Self::with_endpoint(network, &endpoint, Some(anvil)).await
            }
        }
    }

    async fn with_endpoint(
        network: &NetworkConfig,
        url: &str,
        maybe_anvil: Option<AnvilInstance>,
    ) -> Result<Self, FillError> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| ConfigurationError::InvalidRpcUrl {
                url: url.to_string(),
                message: e.to_string(),
            })?
            .interval(Duration::from_millis(10));
        let connect_error = |source| FillError::Connect {
            url: url.to_string(),
            source,
        };
        let client_version = provider.client_version().await.map_err(connect_error)?;
        let chain_id = provider.get_chainid().await.map_err(connect_error)?.as_u64();
        if chain_id != network.chain_id {
            return Err(ConfigurationError::ChainIdMismatch {
                network: network.name.to_string(),
                expected: network.chain_id,
                actual: chain_id,
            }
            .into());
        }
        info!(%client_version, chain_id, "connected");

        Ok(Self {
            provider: Arc::new(provider),
            chain_id,
            kind: NodeKind::from_client_version(&client_version),
            keyring: Keyring::default(),
            _maybe_anvil: maybe_anvil,
        })
    }

    /// Uses the keys in `keyring` to sign for depositors that the node can't
    /// impersonate.
    pub fn with_keyring(mut self, keyring: Keyring) -> Self {
        self.keyring = keyring;
        self
    }

    /// A provider that can access the chain.
    pub fn provider(&self) -> Arc<Provider<Http>> {
        self.provider.clone()
    }

}

/// Spawns an anvil node that forks `fork_url`. Anvil's builder panics if the
/// node doesn't come up, so the spawn runs on a blocking task and a panic is
/// reported as an error.
async fn spawn_fork(fork_url: &str, chain_id: u64) -> Result<AnvilInstance, FillError> {
    let spawn_error = |message: String| FillError::SpawnNode {
        fork_url: fork_url.to_string(),
        message,
    };

    Command::new("anvil")
        .arg("--version")
        .output()
        .await
        .map_err(|e| spawn_error(format!("couldn't run anvil: {e}")))?;

    let anvil = Anvil::new().fork(fork_url).chain_id(chain_id);
    tokio::task::spawn_blocking(move || anvil.spawn())
        .await
        .map_err(|e| match e.try_into_panic() {
            Ok(panic) => spawn_error(panic_message(&*panic)),
            Err(e) => spawn_error(e.to_string()),
        })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "anvil panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind() {
        assert_eq!(
            NodeKind::from_client_version("anvil/v0.2.0"),
            NodeKind::Anvil
        );
        assert_eq!(
            NodeKind::from_client_version("HardhatNetwork/2.17.0/@ethereumjs/vm/5.9.3"),
            NodeKind::Hardhat
        );
        assert_eq!(
            NodeKind::from_client_version("Geth/v1.13.5-stable/linux-amd64/go1.21.4"),
            NodeKind::Other
        );
        assert_eq!(NodeKind::Other.impersonate_method(), None);
    }

    #[test]
    fn test_panic_message() {
        let panic: Box<dyn Any + Send> = Box::new("couldnt start anvil");
        assert_eq!(panic_message(&*panic), "couldnt start anvil");
        let panic: Box<dyn Any + Send> = Box::new(String::from("Timed out waiting for anvil"));
        assert_eq!(panic_message(&*panic), "Timed out waiting for anvil");
        let panic: Box<dyn Any + Send> = Box::new(7);
        assert_eq!(panic_message(&*panic), "anvil panicked");
    }
}
