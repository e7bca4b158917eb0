use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Connection state of the local user. Lives only as long as the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub connected: bool,
    pub connecting: bool,
    pub is_owner: bool,
    pub account: Option<Address>,
}

/// Read-only projection of the latest round, replaced wholesale on each refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRoundView {
    pub round_id: Option<String>,
    pub started: bool,
    pub entry_fee: U256,
    pub max_players: u32,
    pub players: Vec<String>,
    pub winner: Option<String>,
}

impl GameRoundView {
    pub fn is_full(&self) -> bool {
        self.players.len() == self.max_players as usize
    }
}

/// Most recent round as recorded by the indexing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub id: String,
    pub winner: Option<String>,
    pub players: Vec<String>,
    pub entry_fee: U256,
    pub max_players: u32,
}

impl RoundRecord {
    pub fn has_winner(&self) -> bool {
        self.winner.as_deref().is_some_and(|w| !w.is_empty())
    }
}
