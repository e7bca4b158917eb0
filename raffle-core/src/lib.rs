//! Client library for the random winner lottery game
//!
//! Connects to a wallet over JSON-RPC, reads the game contract and its
//! indexing service, and projects both into the single action the user can
//! take next: connect, start a round, join a round, or wait.

pub mod config;
pub mod contract;
pub mod error;
pub mod game;
pub mod indexer;
pub mod types;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use config::GameConfig;
pub use error::{RaffleError, Result};
pub use game::{AppState, GameClient, PrimaryAction, UiState};
pub use types::{GameRoundView, RoundRecord, Session};

pub use ethers::types::{Address, TxHash, U256};
