use std::{error::Error as StdError, fmt, path::PathBuf};

use ethers::{
    providers::ProviderError,
    signers::WalletError,
    types::Address,
};
use thiserror::Error;
use vault_addresses::{DepositorsError, ManifestError, Token};

pub type DynError = Box<dyn StdError + Send + Sync + 'static>;

/// A precondition of the run that isn't satisfied. These are always fatal.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("couldn't load {path}: {source}")]
    MissingEnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("FRONTEND_PATH is not set")]
    MissingFrontendPath,
    #[error("invalid environment: {0}")]
    Env(#[from] envy::Error),
    #[error("unknown network {0:?} (expected hardhat, localhost, or tenderly)")]
    UnknownNetwork(String),
    #[error("the tenderly network needs a TENDERLY_URL")]
    MissingTenderlyUrl,
    #[error("invalid rpc url {url}: {message}")]
    InvalidRpcUrl { url: String, message: String },
    #[error("connected to chain {actual}, but the {network} network expects chain {expected}")]
    ChainIdMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },
    #[error("DEPOSITOR_KEYS entry {index} isn't a valid private key")]
    InvalidDepositorKey { index: usize },
    #[error("couldn't derive the default depositors: {0}")]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Depositors(#[from] DepositorsError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    ResolveVault,
    ResolveSigner,
    Approve,
    Deposit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::ResolveVault => "resolve vault",
            Operation::ResolveSigner => "resolve signer",
            Operation::Approve => "approve",
            Operation::Deposit => "deposit",
        })
    }
}

/// A failure surfaced by the chain client. Reverts and transport failures are
/// treated the same way.
#[derive(Debug)]
pub struct ChainInteractionError {
    pub operation: Operation,
    pub token: Option<Token>,
    pub account: Option<Address>,
    pub source: DynError,
}

impl ChainInteractionError {
    pub fn new<E: Into<DynError>>(operation: Operation, source: E) -> Self {
        Self {
            operation,
            token: None,
            account: None,
            source: source.into(),
        }
    }

    pub fn token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    pub fn account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }
}

impl fmt::Display for ChainInteractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;
        if let Some(token) = self.token {
            write!(f, " {token}")?;
        }
        if let Some(account) = self.account {
            write!(f, " for {account:?}")?;
        }
        write!(f, " failed: {}", self.source)
    }
}

impl StdError for ChainInteractionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

/// The step of a depositor's funding that failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Signer,
    Approve,
    Deposit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Signer => "signer",
            Stage::Approve => "approvals",
            Stage::Deposit => "deposits",
        })
    }
}

#[derive(Debug, Error)]
#[error("depositor {depositor:?} failed during {stage}:{}", bullet_list(.errors, 4))]
pub struct DepositorFailure {
    pub depositor: Address,
    pub stage: Stage,
    pub errors: Vec<ChainInteractionError>,
}

#[derive(Debug, Error)]
pub enum FillError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("couldn't spawn an anvil node forking {fork_url}: {message}")]
    SpawnNode { fork_url: String, message: String },
    #[error("couldn't connect to {url}: {source}")]
    Connect { url: String, source: ProviderError },
    #[error("vault resolution failed:{}", bullet_list(.0, 2))]
    VaultResolution(Vec<ChainInteractionError>),
    #[error("{} of {total} depositors failed:{}", .failures.len(), bullet_list(.failures, 2))]
    Depositors {
        failures: Vec<DepositorFailure>,
        total: usize,
    },
}

fn bullet_list<T: fmt::Display>(items: &[T], indent: usize) -> String {
    items
        .iter()
        .map(|item| format!("\n{:indent$}- {item}", ""))
        .collect()
}
