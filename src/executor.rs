//! Transaction execution for bet actions
//!
//! Every write is signed with the configured key and sent straight to the
//! bet or factory contract. The contract decides whether the call is allowed;
//! nothing here duplicates its rules.

use crate::config::Config;
use crate::contracts::{IBet, IBetFactory};
use crate::services::tx_errors::{TxAction, TxError};
use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::signers::{local::PrivateKeySigner, Signer};
use serde::Serialize;
use tracing::{debug, error, info};

/// A mined, successful bet transaction
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    /// Address of the new bet, for `createBet`
    pub bet: Option<Address>,
}

/// Parameters of a new bet
#[derive(Debug, Clone)]
pub struct NewBet {
    pub better1: Address,
    pub better2: Address,
    pub decider: Address,
    pub wager: U256,
    pub conditions: String,
}

/// Signs and submits bet transactions
pub struct BetActions {
    signer: PrivateKeySigner,
    rpc_url: String,
    factory: Address,
}

impl BetActions {
    pub fn new(config: &Config) -> Result<Self, TxError> {
        let private_key = config.private_key.as_deref().ok_or(TxError::NoSigner)?;
        let key = private_key.strip_prefix("0x").unwrap_or(private_key);

        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| TxError::InvalidSetup(format!("invalid PRIVATE_KEY: {}", e)))?;

        Ok(Self {
            signer: signer.with_chain_id(Some(config.chain_id)),
            rpc_url: config.rpc_url.clone(),
            factory: config.factory_address,
        })
    }

    /// Address transactions are sent from
    pub fn account(&self) -> Address {
        self.signer.address()
    }

    async fn provider(&self) -> Result<impl Provider, TxError> {
        ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.signer.clone()))
            .connect(&self.rpc_url)
            .await
            .map_err(|e| TxError::InvalidSetup(format!("cannot connect to {}: {}", self.rpc_url, e)))
    }

    /// `createBet` on the factory. The caller pays gas only; betters fund later.
    pub async fn create_bet(&self, bet: &NewBet) -> Result<ExecutionResult, TxError> {
        info!(
            "[Tx] createBet {:?} vs {:?}, decider {:?}, wager {} wei: {}",
            bet.better1, bet.better2, bet.decider, bet.wager, bet.conditions
        );

        let provider = self.provider().await?;
        let factory = IBetFactory::new(self.factory, &provider);
        let pending = factory
            .createBet(bet.better1, bet.better2, bet.decider, bet.wager, bet.conditions.clone())
            .send()
            .await
            .map_err(|e| submit_failed(TxAction::Create, e))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| TxError::from_message(&e.to_string()))?;

        if !receipt.status() {
            error!("[Tx] createBet {:?} reverted", receipt.transaction_hash);
            return Err(TxError::Failed(format!("{:?}", receipt.transaction_hash)));
        }

        let created = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == self.factory)
            .find_map(|log| log.log_decode::<IBetFactory::BetCreated>().ok())
            .map(|log| log.inner.data.betAddress);

        match created {
            Some(address) => info!("[Tx] new bet at {:?}", address),
            None => debug!("[Tx] no BetCreated event in receipt"),
        }

        Ok(ExecutionResult {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            bet: created,
        })
    }

    /// `fundBet` with `wager` attached as value
    pub async fn fund_bet(&self, bet: Address, wager: U256) -> Result<ExecutionResult, TxError> {
        info!("[Tx] fundBet {:?} with {} wei", bet, wager);
        let provider = self.provider().await?;
        let pending = IBet::new(bet, &provider)
            .fundBet()
            .value(wager)
            .send()
            .await
            .map_err(|e| submit_failed(TxAction::Fund, e))?;
        confirm(TxAction::Fund, pending).await
    }

    pub async fn cancel_bet(&self, bet: Address) -> Result<ExecutionResult, TxError> {
        info!("[Tx] cancelBet {:?}", bet);
        let provider = self.provider().await?;
        let pending = IBet::new(bet, &provider)
            .cancelBet()
            .send()
            .await
            .map_err(|e| submit_failed(TxAction::Cancel, e))?;
        confirm(TxAction::Cancel, pending).await
    }

    pub async fn invalidate_bet(&self, bet: Address) -> Result<ExecutionResult, TxError> {
        info!("[Tx] invalidateBet {:?}", bet);
        let provider = self.provider().await?;
        let pending = IBet::new(bet, &provider)
            .invalidateBet()
            .send()
            .await
            .map_err(|e| submit_failed(TxAction::Invalidate, e))?;
        confirm(TxAction::Invalidate, pending).await
    }

    pub async fn resolve_bet(&self, bet: Address, winner: Address) -> Result<ExecutionResult, TxError> {
        info!("[Tx] resolveBet {:?} winner {:?}", bet, winner);
        let provider = self.provider().await?;
        let pending = IBet::new(bet, &provider)
            .resolveBet(winner)
            .send()
            .await
            .map_err(|e| submit_failed(TxAction::Resolve, e))?;
        confirm(TxAction::Resolve, pending).await
    }
}

fn submit_failed(action: TxAction, err: alloy::contract::Error) -> TxError {
    let err = TxError::from_message(&err.to_string());
    error!("[Tx] {} not submitted: {}", action, err);
    err
}

/// Wait for the receipt and map a failed status to [`TxError::Failed`]
async fn confirm(
    action: TxAction,
    pending: PendingTransactionBuilder<Ethereum>,
) -> Result<ExecutionResult, TxError> {
    let tx_hash = *pending.tx_hash();
    debug!("[Tx] {} submitted as {:?}, waiting for receipt", action, tx_hash);

    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| TxError::from_message(&e.to_string()))?;

    if !receipt.status() {
        error!("[Tx] {} {:?} reverted", action, tx_hash);
        return Err(TxError::Failed(format!("{:?}", tx_hash)));
    }

    info!("[Tx] {} confirmed in block {:?}", action, receipt.block_number);
    Ok(ExecutionResult {
        tx_hash,
        block_number: receipt.block_number,
        bet: None,
    })
}
