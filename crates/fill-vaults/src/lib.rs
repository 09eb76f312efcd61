pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod fill;
pub mod summary;

pub use chain::{CallOptions, Chain, LocalClient, NodeSigner, VaultChain};
pub use config::{Config, Keyring, NetworkConfig, NetworkName};
pub use error::{
    ChainInteractionError, ConfigurationError, DepositorFailure, FillError, Operation, Stage,
};
pub use fill::{fill_vaults, fund_depositor, resolve_vaults, FundingPlan, Vaults};
pub use summary::Summary;
