use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    abi::Detokenize,
    contract::builders::ContractCall,
    middleware::{NonceManagerMiddleware, SignerMiddleware},
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, TxHash, U256, U64},
};
use tracing::debug;
use vault_addresses::TokenDescriptor;
use vault_wrappers::wrappers::{ierc20::IERC20, manager::Manager, vault::Vault};

use super::{CallOptions, Chain};
use crate::error::{ChainInteractionError, Operation};

/// A client that signs with a local key. Every write of a depositor goes
/// through the same client so that concurrent sends get distinct nonces.
pub type LocalClient = NonceManagerMiddleware<SignerMiddleware<Provider<Http>, LocalWallet>>;

/// An account that transactions can be sent from. Either the node signs for
/// the account or the signer carries a client with the account's key.
#[derive(Clone, Debug)]
pub struct NodeSigner {
    address: Address,
    client: Option<Arc<LocalClient>>,
}

impl NodeSigner {
    /// Binds a signer to `address`. Chain clients hand these out once the
    /// node is able to sign for the address.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            client: None,
        }
    }

    /// A signer that signs locally through `client`.
    pub fn local(client: Arc<LocalClient>) -> Self {
        Self {
            address: client.inner().address(),
            client: Some(client),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn is_local(&self) -> bool {
        self.client.is_some()
    }
}

/// The operations that funding the vaults needs from the chain. Writes only
/// return once the transaction has been confirmed.
#[async_trait]
pub trait VaultChain: Send + Sync {
    /// Asks the manager for the vault that holds `token`.
    async fn vault(
        &self,
        manager: Address,
        token: &TokenDescriptor,
    ) -> Result<Address, ChainInteractionError>;

    /// Resolves a signer bound to `address`.
    async fn signer(&self, address: Address) -> Result<NodeSigner, ChainInteractionError>;

    /// Approves `spender` to pull `amount` of `token` from the signer.
    async fn approve(
        &self,
        signer: &NodeSigner,
        token: &TokenDescriptor,
        spender: Address,
        amount: U256,
        options: &CallOptions,
    ) -> Result<TxHash, ChainInteractionError>;

    /// Deposits `amount` of the vault's token on behalf of `receiver`.
    async fn deposit(
        &self,
        signer: &NodeSigner,
        token: &TokenDescriptor,
        vault: Address,
        amount: U256,
        receiver: Address,
        options: &CallOptions,
    ) -> Result<TxHash, ChainInteractionError>;
}

#[async_trait]
impl VaultChain for Chain {
    async fn vault(
        &self,
        manager: Address,
        token: &TokenDescriptor,
    ) -> Result<Address, ChainInteractionError> {
        let manager = Manager::new(manager, self.provider());
        manager
            .vaults(token.address)
            .call()
            .await
            .map_err(|e| ChainInteractionError::new(Operation::ResolveVault, e).token(token.token))
    }

    async fn signer(&self, address: Address) -> Result<NodeSigner, ChainInteractionError> {
        if let Some(method) = self.kind.impersonate_method() {
            self.provider()
                .request::<[Address; 1], ()>(method, [address])
                .await
                .map_err(|e| {
                    ChainInteractionError::new(Operation::ResolveSigner, e).account(address)
                })?;
            debug!(?address, method, "impersonating depositor");
            return Ok(NodeSigner::new(address));
        }

        match self.keyring.wallet(address) {
            Some(wallet) => {
                let wallet = wallet.clone().with_chain_id(self.chain_id);
                let client = SignerMiddleware::new(self.provider.as_ref().clone(), wallet);
                let client = NonceManagerMiddleware::new(client, address);
                debug!(?address, "signing locally");
                Ok(NodeSigner::local(Arc::new(client)))
            }
            None => {
                debug!(?address, "no key for depositor, the node has to sign");
                Ok(NodeSigner::new(address))
            }
        }
    }

    async fn approve(
        &self,
        signer: &NodeSigner,
        token: &TokenDescriptor,
        spender: Address,
        amount: U256,
        options: &CallOptions,
    ) -> Result<TxHash, ChainInteractionError> {
        let result = match &signer.client {
            Some(client) => {
                let erc20 = IERC20::new(token.address, client.clone());
                submit(options.apply(erc20.approve(spender, amount)), Operation::Approve).await
            }
            None => {
                let erc20 = IERC20::new(token.address, self.provider());
                let call = erc20.approve(spender, amount).from(signer.address());
                submit(options.apply(call), Operation::Approve).await
            }
        };
        result.map_err(|e| e.token(token.token).account(signer.address()))
    }

    async fn deposit(
        &self,
        signer: &NodeSigner,
        token: &TokenDescriptor,
        vault: Address,
        amount: U256,
        receiver: Address,
        options: &CallOptions,
    ) -> Result<TxHash, ChainInteractionError> {
        let result = match &signer.client {
            Some(client) => {
                let vault = Vault::new(vault, client.clone());
                submit(options.apply(vault.deposit(amount, receiver)), Operation::Deposit).await
            }
            None => {
                let vault = Vault::new(vault, self.provider());
                let call = vault.deposit(amount, receiver).from(signer.address());
                submit(options.apply(call), Operation::Deposit).await
            }
        };
        result.map_err(|e| e.token(token.token).account(signer.address()))
    }
}

/// Sends the call and waits for its receipt. A dropped transaction or a
/// reverted receipt counts as a failure.
async fn submit<M: Middleware + 'static, D: Detokenize>(
    call: ContractCall<M, D>,
    operation: Operation,
) -> Result<TxHash, ChainInteractionError> {
    let pending = call
        .send()
        .await
        .map_err(|e| ChainInteractionError::new(operation, e))?;
    let tx_hash = *pending;
    let receipt = pending
        .await
        .map_err(|e| ChainInteractionError::new(operation, e))?
        .ok_or_else(|| {
            ChainInteractionError::new(operation, format!("transaction {tx_hash:?} was dropped"))
        })?;
    if receipt.status == Some(U64::zero()) {
        return Err(ChainInteractionError::new(
            operation,
            format!("transaction {tx_hash:?} reverted"),
        ));
    }
    debug!(?tx_hash, %operation, "confirmed");
    Ok(tx_hash)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        chain::NodeKind,
        config::{default_depositors, Config},
    };

    /// A chain that can't impersonate. Resolving a local signer doesn't touch
    /// the network, so nothing has to listen on the url.
    fn tenderly_chain(config: &Config) -> Result<Chain, Box<dyn std::error::Error>> {
        let provider = Provider::<Http>::try_from("http://127.0.0.1:1")?
            .interval(Duration::from_millis(10));
        Ok(Chain {
            provider: Arc::new(provider),
            chain_id: 42161,
            kind: NodeKind::Other,
            keyring: Default::default(),
            _maybe_anvil: None,
        }
        .with_keyring(config.keyring.clone()))
    }

    fn config() -> Result<Config, Box<dyn std::error::Error>> {
        Ok(Config::from_vars(vec![(
            "FRONTEND_PATH".to_string(),
            "../frontend".to_string(),
        )])?)
    }

    #[tokio::test]
    async fn test_dev_depositor_signs_locally() -> Result<(), Box<dyn std::error::Error>> {
        let chain = tenderly_chain(&config()?)?;
        let depositor = default_depositors(1)?[0];

        let signer = chain.signer(depositor).await?;
        assert!(signer.is_local());
        assert_eq!(signer.address(), depositor);
        let client = signer.client.as_ref().ok_or("missing client")?;
        assert_eq!(client.inner().signer().address(), depositor);
        assert_eq!(client.inner().signer().chain_id(), 42161);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_depositor_is_signed_by_node() -> Result<(), Box<dyn std::error::Error>> {
        let chain = tenderly_chain(&config()?)?;
        let stranger = Address::repeat_byte(0x42);

        let signer = chain.signer(stranger).await?;
        assert!(!signer.is_local());
        assert_eq!(signer.address(), stranger);
        Ok(())
    }
}
