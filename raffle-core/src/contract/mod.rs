use crate::error::{RaffleError, Result, USER_REJECTED_CODE};
use async_trait::async_trait;
use ethers::contract::{abigen, ContractError};
use ethers::providers::{Http, Provider, RpcError};
use ethers::types::{Address, TxHash, U256, U64};
use std::sync::Arc;

abigen!(
    RandomWinnerGame,
    r#"[
        function gameStarted() external view returns (bool)
        function owner() external view returns (address)
        function startGame(uint8 _maxPlayers, uint256 _entryFee) external
        function joinedGame() external payable
    ]"#
);

/// Read and write surface of the on-chain game.
#[async_trait]
pub trait GameContract: Send + Sync {
    async fn game_started(&self) -> Result<bool>;

    async fn owner(&self) -> Result<Address>;

    /// Submits `startGame` from `from` and resolves once it is confirmed.
    async fn start_game(&self, from: Address, max_players: u8, entry_fee: U256) -> Result<TxHash>;

    /// Submits `joinedGame` carrying `entry_fee` and resolves once it is confirmed.
    async fn join_game(&self, from: Address, entry_fee: U256) -> Result<TxHash>;
}

pub struct LotteryContract {
    contract: RandomWinnerGame<Provider<Http>>,
    confirmations: usize,
}

impl LotteryContract {
    pub fn new(provider: Provider<Http>, address: Address, confirmations: usize) -> Self {
        Self {
            contract: RandomWinnerGame::new(address, Arc::new(provider)),
            confirmations,
        }
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }
}

#[async_trait]
impl GameContract for LotteryContract {
    async fn game_started(&self) -> Result<bool> {
        self.contract
            .game_started()
            .call()
            .await
            .map_err(|e| contract_error(e, "gameStarted() failed"))
    }

    async fn owner(&self) -> Result<Address> {
        self.contract
            .owner()
            .call()
            .await
            .map_err(|e| contract_error(e, "owner() failed"))
    }

    async fn start_game(&self, from: Address, max_players: u8, entry_fee: U256) -> Result<TxHash> {
        let call = self.contract.start_game(max_players, entry_fee).from(from);
        let pending = call
            .send()
            .await
            .map_err(|e| contract_error(e, "startGame submission failed"))?;
        let tx_hash = pending.tx_hash();
        tracing::info!(tx_hash = %format!("{:#x}", tx_hash), "startGame submitted");

        let receipt = pending
            .confirmations(self.confirmations)
            .await
            .map_err(|e| RaffleError::contract(format!("startGame confirmation failed: {}", e)))?;
        check_receipt(receipt, tx_hash)
    }

    async fn join_game(&self, from: Address, entry_fee: U256) -> Result<TxHash> {
        let call = self.contract.joined_game().from(from).value(entry_fee);
        let pending = call
            .send()
            .await
            .map_err(|e| contract_error(e, "joinedGame submission failed"))?;
        let tx_hash = pending.tx_hash();
        tracing::info!(tx_hash = %format!("{:#x}", tx_hash), "joinedGame submitted");

        let receipt = pending
            .confirmations(self.confirmations)
            .await
            .map_err(|e| RaffleError::contract(format!("joinedGame confirmation failed: {}", e)))?;
        check_receipt(receipt, tx_hash)
    }
}

fn check_receipt(
    receipt: Option<ethers::types::TransactionReceipt>,
    tx_hash: TxHash,
) -> Result<TxHash> {
    let Some(receipt) = receipt else {
        return Err(RaffleError::contract(format!(
            "Transaction {:#x} dropped from mempool",
            tx_hash
        )));
    };
    if receipt.status == Some(U64::zero()) {
        return Err(RaffleError::contract(format!(
            "Transaction {:#x} reverted",
            tx_hash
        )));
    }
    Ok(tx_hash)
}

fn contract_error(err: ContractError<Provider<Http>>, context: &str) -> RaffleError {
    let code = match &err {
        ContractError::MiddlewareError { e } => e.as_error_response().map(|resp| resp.code),
        ContractError::ProviderError { e } => e.as_error_response().map(|resp| resp.code),
        _ => None,
    };
    if code == Some(USER_REJECTED_CODE) {
        return RaffleError::UserRejected;
    }
    RaffleError::contract(format!("{}: {}", context, err))
}
