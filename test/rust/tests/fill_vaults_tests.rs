use eyre::Result;
use fill_vaults::{
    constants::ENV_FILE, fill_vaults, resolve_vaults, Chain, Config, FundingPlan, Summary,
};
use vault_addresses::{Addresses, Token};
use vault_wrappers::wrappers::{ierc20::IERC20, vault::Vault};

// TODO: We should be able to run this in CI once the frontend deployment can
// be reproduced on a fresh fork.
#[ignore]
#[tokio::test]
async fn test_fill_vaults() -> Result<()> {
    // Set up the logger.
    tracing_subscriber::fmt::init();

    // Connect to the network described by the env file. The vault system has
    // to be deployed there already.
    let config = Config::load(ENV_FILE)?;
    let addresses = Addresses::load(config.manifest_path())?;
    let chain = Chain::connect(&config.network)
        .await?
        .with_keyring(config.keyring.clone());
    let vaults = resolve_vaults(&chain, addresses.manager).await?;

    // The registry agrees with the deployment.
    for (token, vault) in vaults.iter() {
        let descriptor = token.descriptor();
        let erc20 = IERC20::new(descriptor.address, chain.provider());
        assert_eq!(erc20.decimals().call().await?, descriptor.decimals);
        let vault = Vault::new(vault, chain.provider());
        assert_eq!(vault.asset().call().await?, descriptor.address);
    }

    // Record the depositors' balances before the run.
    let plan = FundingPlan::default();
    let mut balances = vec![];
    for depositor in &config.depositors {
        for token in Token::ALL {
            let erc20 = IERC20::new(token.descriptor().address, chain.provider());
            balances.push(erc20.balance_of(*depositor).call().await?);
        }
    }

    let summary = fill_vaults(&chain, addresses.manager, &config.depositors).await?;
    assert_eq!(summary, Summary::new(config.depositors.len()));

    // Every depositor paid the plan's amount of each token into its vault.
    let mut balances = balances.into_iter();
    for depositor in &config.depositors {
        for (token, vault) in vaults.iter() {
            assert!(!vault.is_zero());
            let erc20 = IERC20::new(token.descriptor().address, chain.provider());
            let before = balances.next().unwrap();
            let after = erc20.balance_of(*depositor).call().await?;
            assert_eq!(before - after, plan.amount(token));
        }
    }

    Ok(())
}
