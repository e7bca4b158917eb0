pub mod input;
pub mod projection;
pub mod state;

pub use input::{parse_entry_fee, parse_max_players};
pub use projection::{display_ether, fold_round, PrimaryAction, UiState};
pub use state::{AppState, Applied, StateStore, Transition};

use crate::config::GameConfig;
use crate::contract::{GameContract, LotteryContract};
use crate::error::{RaffleError, Result};
use crate::indexer::{RoundIndexer, SubgraphClient};
use crate::wallet::{ensure_network, InjectedWallet, WalletProvider};
use ethers::types::{Address, TxHash, U256};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Keeps a projection of the remote game and performs the user's actions.
pub struct GameClient {
    config: GameConfig,
    wallet: Arc<dyn WalletProvider>,
    contract: Arc<dyn GameContract>,
    indexer: Arc<dyn RoundIndexer>,
    store: StateStore,
}

impl GameClient {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;

        let wallet = InjectedWallet::new(&config.rpc_url)?;
        let contract = LotteryContract::new(
            wallet.provider().clone(),
            config.contract_address,
            config.confirmations,
        );
        let indexer = SubgraphClient::new(config.subgraph_url.clone())?;

        Ok(Self::with_parts(
            config,
            Arc::new(wallet),
            Arc::new(contract),
            Arc::new(indexer),
        ))
    }

    pub fn with_parts(
        config: GameConfig,
        wallet: Arc<dyn WalletProvider>,
        contract: Arc<dyn GameContract>,
        indexer: Arc<dyn RoundIndexer>,
    ) -> Self {
        Self {
            config,
            wallet,
            contract,
            indexer,
            store: StateStore::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snapshot(&self) -> AppState {
        self.store.snapshot()
    }

    pub fn ui_state(&self) -> UiState {
        self.store.ui_state()
    }

    /// Receiver that observes every applied state change.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.store.subscribe()
    }

    fn commit(&self, transition: Transition) -> Applied {
        self.store.apply(transition)
    }

    /// Requests wallet access and checks the wallet is on the game's network.
    pub async fn connect(&self) -> Result<Address> {
        self.commit(Transition::ConnectRequested);

        let result: Result<Address> = async {
            let account = self.wallet.request_account().await?;
            ensure_network(self.wallet.as_ref(), self.config.chain_id).await?;
            Ok(account)
        }
        .await;

        match result {
            Ok(account) => {
                tracing::info!(account = %format!("{:#x}", account), "Wallet connected");
                self.commit(Transition::Connected(account));
                Ok(account)
            }
            Err(e) => {
                if e.is_blocking() {
                    tracing::error!("Change network to {}: {}", self.config.network_name, e);
                } else {
                    tracing::error!("Wallet connection failed: {}", e);
                }
                self.commit(Transition::ConnectFailed);
                Err(e)
            }
        }
    }

    fn account(&self) -> Result<Address> {
        let session = self.store.snapshot().session;
        match (session.connected, session.account) {
            (true, Some(account)) => Ok(account),
            _ => Err(RaffleError::NotConnected),
        }
    }

    /// Reads the contract owner and records whether the connected account holds it.
    pub async fn resolve_ownership(&self) -> Result<bool> {
        let account = self.account()?;
        let owner = self.contract.owner().await.map_err(|e| {
            tracing::error!("Failed to read contract owner: {}", e);
            e
        })?;

        // Address equality compares bytes, so checksum casing never matters.
        let is_owner = owner == account;
        tracing::info!(is_owner, "Resolved ownership");
        self.commit(Transition::OwnershipResolved(is_owner));
        Ok(is_owner)
    }

    /// Reads the contract flag and the latest indexed round, then replaces the round view.
    pub async fn refresh_round_state(&self) -> Result<Applied> {
        let generation = self.store.begin_poll();

        let started = self.contract.game_started().await?;
        let record = self.indexer.latest_round().await?;
        let (round, log) = fold_round(started, record.as_ref());

        tracing::debug!(generation, started, players = round.players.len(), "Round refreshed");
        Ok(self.commit(Transition::RoundRefreshed {
            generation,
            round,
            log,
        }))
    }

    /// One poll tick; failures are logged and leave the state untouched.
    pub async fn poll_tick(&self) {
        if let Err(e) = self.refresh_round_state().await {
            tracing::error!("Round refresh failed: {}", e);
        }
    }

    /// Refreshes now and then on every poll interval until the handle is aborted.
    ///
    /// Each tick runs in its own task. Aborting the handle stops new ticks but
    /// lets in-flight refreshes finish and apply.
    pub fn spawn_poller(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let client = self.clone();
                tokio::spawn(async move { client.poll_tick().await });
            }
        })
    }

    fn require_state(&self, wanted: UiState) -> Result<()> {
        let current = self.store.ui_state();
        if current != wanted {
            return Err(RaffleError::ActionUnavailable {
                state: current.to_string(),
            });
        }
        Ok(())
    }

    /// Owner-only: opens a new round.
    pub async fn start_round(&self, max_players: u8, entry_fee: U256) -> Result<TxHash> {
        if max_players == 0 {
            return Err(RaffleError::invalid_input("Max players must be greater than 0"));
        }
        let account = self.account()?;
        self.require_state(UiState::OwnerCanStart)?;
        ensure_network(self.wallet.as_ref(), self.config.chain_id).await?;

        self.commit(Transition::PendingStarted);
        let result = self.contract.start_game(account, max_players, entry_fee).await;
        self.commit(Transition::PendingCleared);

        self.finish_transaction("startGame", result).await
    }

    /// Joins the open round paying the entry fee of the current view.
    pub async fn join_round(&self) -> Result<TxHash> {
        let account = self.account()?;
        self.require_state(UiState::RoundInProgressJoinable)?;
        let entry_fee = self.store.snapshot().round.entry_fee;
        ensure_network(self.wallet.as_ref(), self.config.chain_id).await?;

        self.commit(Transition::PendingStarted);
        let result = self.contract.join_game(account, entry_fee).await;
        self.commit(Transition::PendingCleared);

        self.finish_transaction("joinedGame", result).await
    }

    async fn finish_transaction(&self, method: &str, result: Result<TxHash>) -> Result<TxHash> {
        match result {
            Ok(tx_hash) => {
                tracing::info!(tx_hash = %format!("{:#x}", tx_hash), "{} confirmed", method);
                self.poll_tick().await;
                Ok(tx_hash)
            }
            Err(e) => {
                tracing::error!("{} failed: {}", method, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoundRecord;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    const CHAIN: u64 = 80001;

    struct FakeWallet {
        account: Address,
        chain_id: u64,
        reject: bool,
    }

    #[async_trait]
    impl WalletProvider for FakeWallet {
        async fn request_account(&self) -> Result<Address> {
            if self.reject {
                return Err(RaffleError::UserRejected);
            }
            Ok(self.account)
        }

        async fn chain_id(&self) -> Result<u64> {
            Ok(self.chain_id)
        }
    }

    #[derive(Default)]
    struct FakeContract {
        started: AtomicBool,
        owner: Address,
        joins: Mutex<Vec<(Address, U256)>>,
        starts: Mutex<Vec<(u8, U256)>>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl GameContract for FakeContract {
        async fn game_started(&self) -> Result<bool> {
            Ok(self.started.load(Ordering::SeqCst))
        }

        async fn owner(&self) -> Result<Address> {
            Ok(self.owner)
        }

        async fn start_game(&self, _from: Address, max_players: u8, entry_fee: U256) -> Result<TxHash> {
            self.starts.lock().push((max_players, entry_fee));
            self.started.store(true, Ordering::SeqCst);
            Ok(TxHash::repeat_byte(0x01))
        }

        async fn join_game(&self, from: Address, entry_fee: U256) -> Result<TxHash> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.joins.lock().push((from, entry_fee));
            Ok(TxHash::repeat_byte(0x02))
        }
    }

    #[derive(Default)]
    struct FakeIndexer {
        record: Mutex<Option<RoundRecord>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl RoundIndexer for FakeIndexer {
        async fn latest_round(&self) -> Result<Option<RoundRecord>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(RaffleError::IndexerQuery(vec!["boom".to_string()]));
            }
            Ok(self.record.lock().clone())
        }
    }

    fn player() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn open_round(players: &[&str], max_players: u32) -> RoundRecord {
        RoundRecord {
            id: "1".to_string(),
            winner: None,
            players: players.iter().map(|p| p.to_string()).collect(),
            entry_fee: U256::exp10(16),
            max_players,
        }
    }

    fn client(
        wallet: FakeWallet,
        contract: Arc<FakeContract>,
        indexer: Arc<FakeIndexer>,
    ) -> GameClient {
        let config = GameConfig::new("http://localhost:8545", Address::repeat_byte(0x11));
        GameClient::with_parts(config, Arc::new(wallet), contract, indexer)
    }

    fn wallet(account: Address) -> FakeWallet {
        FakeWallet {
            account,
            chain_id: CHAIN,
            reject: false,
        }
    }

    #[tokio::test]
    async fn test_wrong_network_leaves_disconnected() {
        let game = client(
            FakeWallet {
                account: player(),
                chain_id: 1,
                reject: false,
            },
            Arc::default(),
            Arc::default(),
        );

        let err = game.connect().await.unwrap_err();
        assert!(matches!(err, RaffleError::WrongNetwork { .. }));
        assert!(!game.snapshot().session.connected);
        assert_eq!(game.ui_state(), UiState::Disconnected);
    }

    #[tokio::test]
    async fn test_rejected_prompt_leaves_disconnected() {
        let game = client(
            FakeWallet {
                account: player(),
                chain_id: CHAIN,
                reject: true,
            },
            Arc::default(),
            Arc::default(),
        );

        assert!(matches!(game.connect().await, Err(RaffleError::UserRejected)));
        assert!(!game.snapshot().session.connected);
    }

    #[tokio::test]
    async fn test_owner_match_ignores_case() {
        let owner: Address = "0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD".parse().unwrap();
        let account: Address = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd".parse().unwrap();
        let contract = Arc::new(FakeContract {
            owner,
            ..FakeContract::default()
        });
        let game = client(wallet(account), contract, Arc::default());

        game.connect().await.unwrap();
        assert!(game.resolve_ownership().await.unwrap());
        game.refresh_round_state().await.unwrap();
        assert_eq!(game.ui_state(), UiState::OwnerCanStart);
    }

    #[tokio::test]
    async fn test_ownership_requires_connection() {
        let game = client(wallet(player()), Arc::default(), Arc::default());
        assert!(matches!(
            game.resolve_ownership().await,
            Err(RaffleError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_refresh_open_round_and_join() {
        let contract = Arc::new(FakeContract::default());
        contract.started.store(true, Ordering::SeqCst);
        let indexer = Arc::new(FakeIndexer::default());
        *indexer.record.lock() = Some(open_round(&["0xA", "0xB"], 3));
        let game = client(wallet(player()), contract.clone(), indexer);

        game.connect().await.unwrap();
        game.refresh_round_state().await.unwrap();

        let state = game.snapshot();
        assert_eq!(state.log.len(), 3);
        assert_eq!(
            state.primary_action(),
            PrimaryAction::Join {
                entry_fee: U256::exp10(16)
            }
        );

        game.join_round().await.unwrap();
        assert_eq!(contract.joins.lock().as_slice(), &[(player(), U256::exp10(16))]);
        assert!(!game.snapshot().pending);
    }

    #[tokio::test]
    async fn test_full_round_cannot_be_joined() {
        let contract = Arc::new(FakeContract::default());
        contract.started.store(true, Ordering::SeqCst);
        let indexer = Arc::new(FakeIndexer::default());
        *indexer.record.lock() = Some(open_round(&["0xA", "0xB"], 2));
        let game = client(wallet(player()), contract.clone(), indexer);

        game.connect().await.unwrap();
        game.refresh_round_state().await.unwrap();

        assert_eq!(game.ui_state(), UiState::RoundFullSelectingWinner);
        assert!(matches!(
            game.join_round().await,
            Err(RaffleError::ActionUnavailable { .. })
        ));
        assert!(contract.joins.lock().is_empty());
    }

    #[tokio::test]
    async fn test_pending_while_transaction_in_flight() {
        let gate = Arc::new(Notify::new());
        let contract = Arc::new(FakeContract {
            gate: Some(gate.clone()),
            ..FakeContract::default()
        });
        contract.started.store(true, Ordering::SeqCst);
        let indexer = Arc::new(FakeIndexer::default());
        *indexer.record.lock() = Some(open_round(&[], 3));
        let game = Arc::new(client(wallet(player()), contract, indexer));

        game.connect().await.unwrap();
        game.refresh_round_state().await.unwrap();

        let joining = {
            let game = game.clone();
            tokio::spawn(async move { game.join_round().await })
        };
        while !game.snapshot().pending {
            tokio::task::yield_now().await;
        }
        assert_eq!(game.ui_state(), UiState::AwaitingTransaction);
        assert_eq!(game.snapshot().primary_action(), PrimaryAction::Loading);

        gate.notify_one();
        joining.await.unwrap().unwrap();
        assert!(!game.snapshot().pending);
    }

    #[tokio::test]
    async fn test_start_round_rules() {
        let owner = Address::repeat_byte(0x0b);
        let contract = Arc::new(FakeContract {
            owner,
            ..FakeContract::default()
        });

        let outsider = client(wallet(player()), contract.clone(), Arc::default());
        outsider.connect().await.unwrap();
        outsider.resolve_ownership().await.unwrap();
        outsider.refresh_round_state().await.unwrap();
        assert_eq!(outsider.ui_state(), UiState::WaitingForHost);
        assert!(matches!(
            outsider.start_round(3, U256::exp10(16)).await,
            Err(RaffleError::ActionUnavailable { .. })
        ));

        let host = client(wallet(owner), contract.clone(), Arc::default());
        host.connect().await.unwrap();
        host.resolve_ownership().await.unwrap();
        host.refresh_round_state().await.unwrap();
        assert!(matches!(
            host.start_round(0, U256::exp10(16)).await,
            Err(RaffleError::InvalidInput(_))
        ));

        host.start_round(3, parse_entry_fee("0.01")).await.unwrap();
        assert_eq!(contract.starts.lock().as_slice(), &[(3, U256::exp10(16))]);
        // Refreshed after confirmation
        assert!(host.snapshot().round.started);
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_previous_state() {
        let contract = Arc::new(FakeContract::default());
        contract.started.store(true, Ordering::SeqCst);
        let indexer = Arc::new(FakeIndexer::default());
        *indexer.record.lock() = Some(open_round(&["0xA"], 3));
        let game = client(wallet(player()), contract, indexer.clone());

        game.poll_tick().await;
        let before = game.snapshot();

        indexer.fail.store(true, Ordering::SeqCst);
        game.poll_tick().await;
        let after = game.snapshot();

        assert_eq!(before.log, after.log);
        assert_eq!(before.round, after.round);
        assert_eq!(before.applied_generation(), after.applied_generation());
    }

    #[tokio::test]
    async fn test_poller_refreshes_repeatedly() {
        let indexer = Arc::new(FakeIndexer::default());
        let mut config = GameConfig::new("http://localhost:8545", Address::repeat_byte(0x11));
        config.poll_interval = Duration::from_millis(10);
        let game = Arc::new(GameClient::with_parts(
            config,
            Arc::new(wallet(player())),
            Arc::new(FakeContract::default()),
            indexer,
        ));
        let mut updates = game.subscribe();

        let handle = game.clone().spawn_poller();
        updates.changed().await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.abort();

        assert!(game.snapshot().applied_generation() >= 2);
    }
}
