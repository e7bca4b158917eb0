use super::connect;
use comfy_table::{presets::UTF8_FULL, Table};
use raffle_core::game::display_ether;
use raffle_core::{AppState, GameClient, Result};
use std::sync::Arc;

pub async fn show_status(client: &GameClient) -> Result<()> {
    connect(client).await?;
    client.refresh_round_state().await?;
    print_state(&client.snapshot());
    Ok(())
}

pub async fn watch(client: GameClient) -> Result<()> {
    connect(&client).await?;

    let client = Arc::new(client);
    let mut updates = client.subscribe();
    let poller = client.clone().spawn_poller();

    println!("Watching round, press Ctrl-C to stop");
    let mut last_rendered: Option<(Vec<String>, String)> = None;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                let rendered = (state.log.clone(), state.primary_action().label());
                if last_rendered.as_ref() != Some(&rendered) {
                    print_state(&state);
                    last_rendered = Some(rendered);
                }
            }
            _ = &mut ctrl_c => {
                println!();
                println!("Stopped");
                break;
            }
        }
    }

    poller.abort();
    Ok(())
}

fn print_state(state: &AppState) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);

    let account = state
        .session
        .account
        .map(|a| format!("{:#x}", a))
        .unwrap_or_else(|| "-".to_string());
    table.add_row(vec!["Account".to_string(), account]);
    table.add_row(vec![
        "Role".to_string(),
        if state.session.is_owner { "Owner" } else { "Player" }.to_string(),
    ]);
    table.add_row(vec![
        "Round".to_string(),
        state.round.round_id.clone().unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec![
        "Started".to_string(),
        state.round.started.to_string(),
    ]);
    if state.round.started {
        table.add_row(vec![
            "Entry fee".to_string(),
            format!("{} ETH", display_ether(state.round.entry_fee)),
        ]);
        table.add_row(vec![
            "Players".to_string(),
            format!("{} / {}", state.round.players.len(), state.round.max_players),
        ]);
    }
    table.add_row(vec!["State".to_string(), state.ui_state().to_string()]);

    let action = state.primary_action();
    let label = action.label();
    let action_text = match (label.is_empty(), action.is_enabled()) {
        (true, _) => "-".to_string(),
        (false, true) => label,
        (false, false) => format!("{} (disabled)", label),
    };
    table.add_row(vec!["Action".to_string(), action_text]);

    if let Some(at) = state.last_refresh {
        table.add_row(vec![
            "Updated".to_string(),
            at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ]);
    }

    println!("{}", table);
    for line in &state.log {
        println!("  {}", line);
    }
}
