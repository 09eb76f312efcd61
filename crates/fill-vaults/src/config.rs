use std::{
    collections::BTreeMap,
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use ethers::{
    signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer},
    types::Address,
};
use serde::Deserialize;
use tracing::warn;
use vault_addresses::{depositors::validate_depositors, parse_depositors};

use crate::{
    constants::{
        DEFAULT_DEPOSITOR_COUNT, DEFAULT_ETHEREUM_URL, DEFAULT_FORK_URL, DEV_MNEMONIC,
        LOCAL_CHAIN_ID, MANIFEST_PATH, TENDERLY_CHAIN_ID,
    },
    error::ConfigurationError,
};

/// The raw environment. Every field is optional here so that missing values
/// can be reported with a useful error.
#[derive(Debug, Default, Deserialize)]
struct Env {
    frontend_path: Option<PathBuf>,
    tenderly_url: Option<String>,
    hardhat_network: Option<String>,
    ethereum_url: Option<String>,
    fork_url: Option<String>,
    depositors: Option<String>,
    depositor_keys: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NetworkName {
    /// A local anvil node that forks Arbitrum One.
    #[default]
    Hardhat,
    /// A node that is already running on this machine.
    Localhost,
    /// A tenderly fork of Arbitrum One.
    Tenderly,
}

impl fmt::Display for NetworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NetworkName::Hardhat => "hardhat",
            NetworkName::Localhost => "localhost",
            NetworkName::Tenderly => "tenderly",
        })
    }
}

impl FromStr for NetworkName {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hardhat" => Ok(NetworkName::Hardhat),
            "localhost" => Ok(NetworkName::Localhost),
            "tenderly" => Ok(NetworkName::Tenderly),
            _ => Err(ConfigurationError::UnknownNetwork(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rpc {
    /// Spawn a local node that forks `fork_url`.
    Fork { fork_url: String },
    /// Connect to a node that is already running.
    Remote { url: String },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkConfig {
    pub name: NetworkName,
    pub rpc: Rpc,
    pub chain_id: u64,
}

/// The private keys that transactions can be signed with locally. Nodes that
/// can't impersonate accounts need these to send the depositors' writes.
#[derive(Clone, Debug, Default)]
pub struct Keyring {
    wallets: BTreeMap<Address, LocalWallet>,
}

impl Keyring {
    pub fn insert(&mut self, wallet: LocalWallet) {
        self.wallets.insert(wallet.address(), wallet);
    }

    pub fn wallet(&self, address: Address) -> Option<&LocalWallet> {
        self.wallets.get(&address)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}

impl Extend<LocalWallet> for Keyring {
    fn extend<T: IntoIterator<Item = LocalWallet>>(&mut self, wallets: T) {
        for wallet in wallets {
            self.insert(wallet);
        }
    }
}

/// Everything the vault funding run needs, resolved once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub frontend_path: PathBuf,
    pub network: NetworkConfig,
    pub depositors: Vec<Address>,
    pub keyring: Keyring,
}

impl Config {
    /// Loads the environment file and builds the configuration from the
    /// process environment. Variables that are already set take precedence
    /// over the file.
    pub fn load<P: AsRef<Path>>(env_file: P) -> Result<Self, ConfigurationError> {
        let env_file = env_file.as_ref();
        dotenvy::from_path(env_file).map_err(|source| ConfigurationError::MissingEnvFile {
            path: env_file.to_path_buf(),
            source,
        })?;
        Self::from_vars(utf8_vars(std::env::vars_os()))
    }

    /// Builds the configuration from a set of environment variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env = envy::from_iter::<_, Env>(vars)?;

        let frontend_path = env
            .frontend_path
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigurationError::MissingFrontendPath)?;

        // Short values are placeholders from the example env file.
        let tenderly_url = env.tenderly_url.filter(|url| {
            let usable = url.len() > 10;
            if !usable && !url.is_empty() {
                warn!(%url, "ignoring TENDERLY_URL since it isn't a usable url");
            }
            usable
        });

        let name = match env.hardhat_network {
            Some(name) if !name.trim().is_empty() => name.parse()?,
            _ => NetworkName::default(),
        };
        let network = match name {
            NetworkName::Hardhat => NetworkConfig {
                name,
                rpc: Rpc::Fork {
                    fork_url: env.fork_url.unwrap_or_else(|| DEFAULT_FORK_URL.to_string()),
                },
                chain_id: LOCAL_CHAIN_ID,
            },
            NetworkName::Localhost => NetworkConfig {
                name,
                rpc: Rpc::Remote {
                    url: env
                        .ethereum_url
                        .unwrap_or_else(|| DEFAULT_ETHEREUM_URL.to_string()),
                },
                chain_id: LOCAL_CHAIN_ID,
            },
            NetworkName::Tenderly => NetworkConfig {
                name,
                rpc: Rpc::Remote {
                    url: tenderly_url.ok_or(ConfigurationError::MissingTenderlyUrl)?,
                },
                chain_id: TENDERLY_CHAIN_ID,
            },
        };

        // The development keys are always available. Extra keys also stand in
        // for the default depositors unless DEPOSITORS is set.
        let dev_wallets = dev_wallets(DEFAULT_DEPOSITOR_COUNT)?;
        let extra_wallets = match env.depositor_keys {
            Some(keys) if !keys.trim().is_empty() => parse_keys(&keys)?,
            _ => vec![],
        };
        let depositors = match env.depositors {
            Some(list) if !list.trim().is_empty() => parse_depositors(&list)?,
            _ if !extra_wallets.is_empty() => {
                let depositors = extra_wallets.iter().map(Signer::address).collect::<Vec<_>>();
                validate_depositors(&depositors)?;
                depositors
            }
            _ => dev_wallets.iter().map(Signer::address).collect(),
        };
        let mut keyring = Keyring::default();
        keyring.extend(dev_wallets);
        keyring.extend(extra_wallets);

        Ok(Self {
            frontend_path,
            network,
            depositors,
            keyring,
        })
    }

    /// The path of the deployment manifest inside the frontend directory.
    pub fn manifest_path(&self) -> PathBuf {
        self.frontend_path.join(MANIFEST_PATH)
    }
}

/// The first `count` development accounts. Local nodes fund and unlock these
/// by default.
pub fn default_depositors(count: u32) -> Result<Vec<Address>, ConfigurationError> {
    Ok(dev_wallets(count)?.iter().map(Signer::address).collect())
}

fn dev_wallets(count: u32) -> Result<Vec<LocalWallet>, ConfigurationError> {
    let mut wallets = vec![];
    let mut builder = MnemonicBuilder::<English>::default().phrase(DEV_MNEMONIC);
    for i in 0..count {
        builder = builder.index(i)?;
        wallets.push(builder.build()?);
    }
    Ok(wallets)
}

/// Parses a comma separated list of hex private keys.
fn parse_keys(list: &str) -> Result<Vec<LocalWallet>, ConfigurationError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(index, key)| {
            key.parse::<LocalWallet>()
                .map_err(|_| ConfigurationError::InvalidDepositorKey { index })
        })
        .collect()
}

/// Drops the variables that aren't valid unicode. None of the variables that
/// the scripts read can be set that way.
fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}
