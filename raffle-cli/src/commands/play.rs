use super::{connect, dialog_error};
use clap::Args;
use dialoguer::{Confirm, Input};
use raffle_core::game::{display_ether, parse_entry_fee, parse_max_players};
use raffle_core::{GameClient, RaffleError, Result, UiState};

#[derive(Args)]
pub struct StartArgs {
    /// Entry fee in ETH (prompted if omitted)
    #[arg(short, long)]
    entry_fee: Option<String>,

    /// Maximum number of players (prompted if omitted)
    #[arg(short, long)]
    max_players: Option<String>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

#[derive(Args)]
pub struct JoinArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub async fn start_round(client: &GameClient, args: StartArgs) -> Result<()> {
    connect(client).await?;
    client.refresh_round_state().await?;
    ensure_state(client, UiState::OwnerCanStart)?;

    let entry_fee = match args.entry_fee {
        Some(fee) => fee,
        None => Input::<String>::new()
            .with_prompt("Entry Fee (ETH)")
            .interact_text()
            .map_err(dialog_error)?,
    };
    let max_players = match args.max_players {
        Some(max) => max,
        None => Input::<String>::new()
            .with_prompt("Max players")
            .interact_text()
            .map_err(dialog_error)?,
    };

    let entry_fee = parse_entry_fee(&entry_fee);
    let max_players = parse_max_players(&max_players);
    if max_players == 0 {
        return Err(RaffleError::invalid_input(
            "Max players must be a number between 1 and 255",
        ));
    }

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Start a round for {} players at {} ETH each?",
                max_players,
                display_ether(entry_fee)
            ))
            .default(true)
            .interact()
            .map_err(dialog_error)?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    println!("Loading...");
    let tx_hash = client.start_round(max_players, entry_fee).await?;
    println!("Round started in transaction {:#x}", tx_hash);
    Ok(())
}

pub async fn join_round(client: &GameClient, args: JoinArgs) -> Result<()> {
    connect(client).await?;
    client.refresh_round_state().await?;
    ensure_state(client, UiState::RoundInProgressJoinable)?;

    let round = client.snapshot().round;
    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Join round {} for {} ETH?",
                round.round_id.as_deref().unwrap_or("-"),
                display_ether(round.entry_fee)
            ))
            .default(true)
            .interact()
            .map_err(dialog_error)?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    println!("Loading...");
    let tx_hash = client.join_round().await?;
    println!("Joined in transaction {:#x}", tx_hash);
    for line in client.snapshot().log {
        println!("  {}", line);
    }
    Ok(())
}

/// Fails before prompting when the projected state does not offer the action.
fn ensure_state(client: &GameClient, wanted: UiState) -> Result<()> {
    let current = client.ui_state();
    if current != wanted {
        return Err(RaffleError::ActionUnavailable {
            state: current.to_string(),
        });
    }
    Ok(())
}
