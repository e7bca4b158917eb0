use crate::types::{GameRoundView, RoundRecord, Session};
use ethers::types::U256;
use ethers::utils::format_ether;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user can do right now. Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiState {
    Disconnected,
    AwaitingWallet,
    AwaitingTransaction,
    RoundFullSelectingWinner,
    RoundInProgressJoinable,
    OwnerCanStart,
    WaitingForHost,
}

impl fmt::Display for UiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UiState::Disconnected => "wallet disconnected",
            UiState::AwaitingWallet => "waiting for the wallet",
            UiState::AwaitingTransaction => "a transaction is pending",
            UiState::RoundFullSelectingWinner => "the round is full and a winner is being chosen",
            UiState::RoundInProgressJoinable => "a round is open for players",
            UiState::OwnerCanStart => "no round is running",
            UiState::WaitingForHost => "waiting for the host to start a round",
        };
        f.write_str(text)
    }
}

/// Control offered for a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryAction {
    Connect,
    Loading,
    ChoosingWinner,
    Join { entry_fee: U256 },
    Start,
    None,
}

impl PrimaryAction {
    pub fn label(&self) -> String {
        match self {
            PrimaryAction::Connect => "Connect your wallet".to_string(),
            PrimaryAction::Loading => "Loading...".to_string(),
            PrimaryAction::ChoosingWinner => "Choosing winner...".to_string(),
            PrimaryAction::Join { entry_fee } => {
                format!("Join Game ({} ETH)", display_ether(*entry_fee))
            }
            PrimaryAction::Start => "Start Game".to_string(),
            PrimaryAction::None => String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(
            self,
            PrimaryAction::Connect | PrimaryAction::Join { .. } | PrimaryAction::Start
        )
    }
}

/// Wei amount as a trimmed decimal ether string.
pub fn display_ether(amount: U256) -> String {
    let text = format_ether(amount);
    match text.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => text,
    }
}

/// First matching rule wins.
pub fn project(session: &Session, round: &GameRoundView, pending: bool) -> UiState {
    if !session.connected {
        return if session.connecting {
            UiState::AwaitingWallet
        } else {
            UiState::Disconnected
        };
    }
    if pending {
        return UiState::AwaitingTransaction;
    }
    if round.started {
        return if round.is_full() {
            UiState::RoundFullSelectingWinner
        } else {
            UiState::RoundInProgressJoinable
        };
    }
    if session.is_owner {
        return UiState::OwnerCanStart;
    }
    UiState::WaitingForHost
}

pub fn primary_action(state: UiState, round: &GameRoundView) -> PrimaryAction {
    match state {
        UiState::Disconnected => PrimaryAction::Connect,
        UiState::AwaitingWallet | UiState::AwaitingTransaction => PrimaryAction::Loading,
        UiState::RoundFullSelectingWinner => PrimaryAction::ChoosingWinner,
        UiState::RoundInProgressJoinable => PrimaryAction::Join {
            entry_fee: round.entry_fee,
        },
        UiState::OwnerCanStart => PrimaryAction::Start,
        UiState::WaitingForHost => PrimaryAction::None,
    }
}

/// Builds the round view and its log lines from one refresh's reads.
///
/// `started` is the contract's answer for this refresh and takes precedence
/// over anything the indexer implies.
pub fn fold_round(started: bool, record: Option<&RoundRecord>) -> (GameRoundView, Vec<String>) {
    let Some(record) = record else {
        let view = GameRoundView {
            started,
            ..GameRoundView::default()
        };
        return (view, Vec::new());
    };

    let view = GameRoundView {
        round_id: Some(record.id.clone()),
        started,
        entry_fee: record.entry_fee,
        max_players: record.max_players,
        players: record.players.clone(),
        winner: record.winner.clone(),
    };

    let mut log = Vec::new();
    if started {
        log.push(format!(
            "Game has started with ID: {} ({} / {} joined)",
            record.id,
            record.players.len(),
            record.max_players
        ));
        log.extend(record.players.iter().map(|p| format!("{} joined", p)));
    } else if record.has_winner() {
        let winner = record.winner.as_deref().unwrap_or_default();
        log.push(format!("Last game has ended with ID: {}", record.id));
        log.push(format!("Winner is: {}", winner));
        log.push("Waiting for host to start new game...".to_string());
    }

    (view, log)
}
