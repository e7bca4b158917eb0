pub mod play;
pub mod round;

pub use play::{join_round, start_round, JoinArgs, StartArgs};
pub use round::{show_status, watch};

use raffle_core::{GameClient, RaffleError, Result};

/// Connects the wallet and learns whether it owns the game. Ownership read
/// failures are logged and the user is treated as a participant.
pub async fn connect(client: &GameClient) -> Result<()> {
    let account = client.connect().await?;
    println!("Connected: {:#x}", account);

    if let Err(e) = client.resolve_ownership().await {
        tracing::warn!("Could not resolve ownership: {}", e);
    }
    Ok(())
}

pub fn dialog_error(err: dialoguer::Error) -> RaffleError {
    RaffleError::dialog(err.to_string())
}
