use crate::game::projection::{primary_action, project, PrimaryAction, UiState};
use crate::types::{GameRoundView, Session};
use chrono::{DateTime, Utc};
use ethers::types::Address;
use parking_lot::Mutex;
use tokio::sync::watch;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub session: Session,
    pub round: GameRoundView,
    pub pending: bool,
    pub log: Vec<String>,
    pub last_refresh: Option<DateTime<Utc>>,
    issued_generation: u64,
    applied_generation: u64,
}

impl AppState {
    pub fn ui_state(&self) -> UiState {
        project(&self.session, &self.round, self.pending)
    }

    pub fn primary_action(&self) -> PrimaryAction {
        primary_action(self.ui_state(), &self.round)
    }

    pub fn applied_generation(&self) -> u64 {
        self.applied_generation
    }
}

#[derive(Debug, Clone)]
pub enum Transition {
    ConnectRequested,
    Connected(Address),
    ConnectFailed,
    OwnershipResolved(bool),
    PendingStarted,
    PendingCleared,
    RoundRefreshed {
        generation: u64,
        round: GameRoundView,
        log: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Changed,
    Stale,
}

impl AppState {
    fn reduce(&mut self, transition: Transition) -> Applied {
        match transition {
            Transition::ConnectRequested => {
                self.session.connecting = true;
            }
            Transition::Connected(account) => {
                self.session.connecting = false;
                self.session.connected = true;
                self.session.account = Some(account);
            }
            Transition::ConnectFailed => {
                self.session = Session::default();
            }
            Transition::OwnershipResolved(is_owner) => {
                self.session.is_owner = is_owner;
            }
            Transition::PendingStarted => self.pending = true,
            Transition::PendingCleared => self.pending = false,
            Transition::RoundRefreshed {
                generation,
                round,
                log,
            } => {
                if generation <= self.applied_generation {
                    return Applied::Stale;
                }
                self.applied_generation = generation;
                self.round = round;
                self.log = log;
                self.last_refresh = Some(Utc::now());
            }
        }
        Applied::Changed
    }
}

/// Sole owner of the client state. All mutation goes through [`StateStore::apply`].
///
/// Subscribers are notified while the lock is held, so the published state
/// follows the same order as the store.
#[derive(Debug)]
pub struct StateStore {
    inner: Mutex<AppState>,
    updates: watch::Sender<AppState>,
}

impl Default for StateStore {
    fn default() -> Self {
        let (updates, _) = watch::channel(AppState::default());
        Self {
            inner: Mutex::new(AppState::default()),
            updates,
        }
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&self, transition: Transition) -> Applied {
        let mut state = self.inner.lock();
        let applied = state.reduce(transition);
        match applied {
            Applied::Changed => {
                self.updates.send_replace(state.clone());
            }
            Applied::Stale => tracing::warn!("Discarded stale round refresh"),
        }
        applied
    }

    /// Issues the generation for a new poll. Strictly increasing.
    pub fn begin_poll(&self) -> u64 {
        let mut state = self.inner.lock();
        state.issued_generation += 1;
        state.issued_generation
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.lock().clone()
    }

    pub fn ui_state(&self) -> UiState {
        self.inner.lock().ui_state()
    }

    /// Receiver that observes every applied change.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.updates.subscribe()
    }
}
