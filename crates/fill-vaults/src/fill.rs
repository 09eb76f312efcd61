//! Seeds the vaults with test liquidity. The manager is asked for the vault of
//! every token, then every depositor approves and deposits a fixed amount of
//! each token. Depositors run concurrently; within a depositor all approvals
//! are confirmed before any deposit is sent.

use ethers::types::{Address, U256};
use futures::future::join_all;
use tracing::{info, instrument, warn};
use vault_addresses::{depositors::validate_depositors, Token, TokenDescriptor};

use crate::{
    chain::{CallOptions, VaultChain},
    constants::{APPROVAL_GAS_LIMIT, USDC_DEPOSIT, USDT_DEPOSIT, WBTC_DEPOSIT, WETH_DEPOSIT},
    error::{
        ChainInteractionError, ConfigurationError, DepositorFailure, FillError, Operation, Stage,
    },
    summary::Summary,
};

/// The vault that holds each token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vaults {
    vaults: [(Token, Address); 4],
}

impl Vaults {
    pub fn get(&self, token: Token) -> Address {
        self.vaults
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, vault)| *vault)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Token, Address)> + '_ {
        self.vaults.iter().copied()
    }
}

/// What every depositor puts into the vaults, in base units.
#[derive(Clone, Debug)]
pub struct FundingPlan {
    deposits: Vec<(&'static TokenDescriptor, U256)>,
    approve_options: CallOptions,
    deposit_options: CallOptions,
}

impl Default for FundingPlan {
    fn default() -> Self {
        let whole_units = |token: Token| match token {
            Token::Usdc => USDC_DEPOSIT,
            Token::Usdt => USDT_DEPOSIT,
            Token::Weth => WETH_DEPOSIT,
            Token::Wbtc => WBTC_DEPOSIT,
        };
        Self {
            deposits: Token::ALL
                .into_iter()
                .map(|token| {
                    let descriptor = token.descriptor();
                    (descriptor, descriptor.base_units(whole_units(token)))
                })
                .collect(),
            approve_options: CallOptions::new().gas_limit(APPROVAL_GAS_LIMIT),
            deposit_options: CallOptions::default(),
        }
    }
}

impl FundingPlan {
    /// The amount of `token` that each depositor deposits.
    pub fn amount(&self, token: Token) -> U256 {
        self.deposits
            .iter()
            .find(|(descriptor, _)| descriptor.token == token)
            .map(|(_, amount)| *amount)
            .unwrap_or_default()
    }

    pub fn deposits(&self) -> impl Iterator<Item = (&'static TokenDescriptor, U256)> + '_ {
        self.deposits.iter().copied()
    }
}

/// Asks the manager for the vault of every token. All of the queries are
/// issued at once and all of them have to succeed.
#[instrument(skip(chain))]
pub async fn resolve_vaults<C: VaultChain + ?Sized>(
    chain: &C,
    manager: Address,
) -> Result<Vaults, FillError> {
    let results = join_all(Token::ALL.into_iter().map(|token| async move {
        let vault = chain.vault(manager, token.descriptor()).await?;
        if vault.is_zero() {
            return Err(ChainInteractionError::new(
                Operation::ResolveVault,
                "manager has no vault for token",
            )
            .token(token));
        }
        Ok::<_, ChainInteractionError>((token, vault))
    }))
    .await;

    let mut vaults = Vec::with_capacity(results.len());
    let mut errors = vec![];
    for result in results {
        match result {
            Ok(vault) => vaults.push(vault),
            Err(e) => errors.push(e),
        }
    }
    if !errors.is_empty() {
        return Err(FillError::VaultResolution(errors));
    }

    for (token, vault) in &vaults {
        info!(%token, ?vault, "resolved vault");
    }
    Ok(Vaults {
        vaults: [vaults[0], vaults[1], vaults[2], vaults[3]],
    })
}

/// Approves and deposits every token of the plan for one depositor. None of
/// the deposits are sent unless all of the approvals went through.
#[instrument(skip(chain, vaults, plan))]
pub async fn fund_depositor<C: VaultChain + ?Sized>(
    chain: &C,
    vaults: &Vaults,
    plan: &FundingPlan,
    depositor: Address,
) -> Result<(), DepositorFailure> {
    let failure = |stage, errors| DepositorFailure {
        depositor,
        stage,
        errors,
    };

    let signer = chain
        .signer(depositor)
        .await
        .map_err(|e| failure(Stage::Signer, vec![e]))?;

    let approvals = join_all(plan.deposits().map(|(token, amount)| {
        chain.approve(
            &signer,
            token,
            vaults.get(token.token),
            amount,
            &plan.approve_options,
        )
    }))
    .await;
    let errors = approvals
        .into_iter()
        .filter_map(Result::err)
        .collect::<Vec<_>>();
    if !errors.is_empty() {
        return Err(failure(Stage::Approve, errors));
    }

    let deposits = join_all(plan.deposits().map(|(token, amount)| {
        chain.deposit(
            &signer,
            token,
            vaults.get(token.token),
            amount,
            depositor,
            &plan.deposit_options,
        )
    }))
    .await;
    let errors = deposits
        .into_iter()
        .filter_map(Result::err)
        .collect::<Vec<_>>();
    if !errors.is_empty() {
        return Err(failure(Stage::Deposit, errors));
    }

    info!("funded depositor");
    Ok(())
}

/// Resolves the vaults and funds every depositor. Every depositor's branch
/// runs to completion; failures are collected and reported together.
pub async fn fill_vaults<C: VaultChain + ?Sized>(
    chain: &C,
    manager: Address,
    depositors: &[Address],
) -> Result<Summary, FillError> {
    validate_depositors(depositors).map_err(ConfigurationError::from)?;

    let vaults = resolve_vaults(chain, manager).await?;
    let plan = FundingPlan::default();

    let results = join_all(
        depositors
            .iter()
            .map(|depositor| fund_depositor(chain, &vaults, &plan, *depositor)),
    )
    .await;
    let failures = results
        .into_iter()
        .filter_map(Result::err)
        .collect::<Vec<_>>();
    if !failures.is_empty() {
        for failure in &failures {
            warn!(depositor = ?failure.depositor, stage = %failure.stage, "depositor failed");
        }
        return Err(FillError::Depositors {
            failures,
            total: depositors.len(),
        });
    }

    Ok(Summary::new(depositors.len()))
}
