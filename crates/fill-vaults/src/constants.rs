/// The environment file that the scripts read their configuration from.
pub const ENV_FILE: &str = ".env.hardhat";

/// The deployment manifest's location relative to the frontend directory.
pub const MANIFEST_PATH: &str = "src/deploy/contracts.json";

// The network presets.
pub const LOCAL_CHAIN_ID: u64 = 1337;
pub const TENDERLY_CHAIN_ID: u64 = 42161;
pub const DEFAULT_FORK_URL: &str = "https://arb1.arbitrum.io/rpc";
pub const DEFAULT_ETHEREUM_URL: &str = "http://127.0.0.1:8545";

/// The mnemonic of the development accounts that anvil and hardhat unlock by
/// default. The default depositors are derived from it.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";
pub const DEFAULT_DEPOSITOR_COUNT: u32 = 5;

/// The gas ceiling supplied with every approval.
pub const APPROVAL_GAS_LIMIT: u64 = 2_000_000;

/// The whole-token amounts that each depositor puts into each vault.
pub const USDC_DEPOSIT: u64 = 1_000;
pub const USDT_DEPOSIT: u64 = 78_000;
pub const WETH_DEPOSIT: u64 = 9;
pub const WBTC_DEPOSIT: u64 = 4;
