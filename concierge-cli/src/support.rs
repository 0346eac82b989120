use anyhow::Result;
use colored::*;
use concierge_call::{
    CallConfig, CallEvent, OwnerController, RosterUpdate, Severity, SyntheticMediaSource,
};
use dialoguer::Confirm;
use std::sync::Arc;
use tracing::warn;

pub async fn run(config: CallConfig, auto_accept: bool) -> Result<()> {
    println!(
        "{}",
        format!(
            "Support desk '{}' connecting to {}",
            config.directory.support(),
            config.relay_url
        )
        .cyan()
    );

    let mut owner = OwnerController::connect(&config, Arc::new(SyntheticMediaSource::new()));

    loop {
        tokio::select! {
            event = owner.next_event() => {
                let Some(event) = event else { break };
                handle_event(&mut owner, event, auto_accept).await?;
            }
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Shutting down...".yellow());
                break;
            }
        }
    }

    owner.dispose().await;
    Ok(())
}

async fn handle_event(owner: &mut OwnerController, event: CallEvent, auto_accept: bool) -> Result<()> {
    match event {
        CallEvent::IncomingCall { from } => {
            println!("{}", format!("Incoming call from {}", from).green().bold());

            let accept = if auto_accept {
                true
            } else {
                let prompt = format!("Accept call from {}?", from);
                tokio::task::spawn_blocking(move || {
                    Confirm::new()
                        .with_prompt(prompt)
                        .default(true)
                        .interact()
                        .unwrap_or(false)
                })
                .await?
            };

            if accept {
                owner.accept().await?;
            } else {
                owner.reject().await?;
            }
        }

        CallEvent::StatusChanged { status, peer } => {
            let peer = peer.map(|p| p.to_string()).unwrap_or_default();
            println!("{} {:?} {}", "status:".bold(), status, peer);
        }

        CallEvent::Roster(update) => {
            match update {
                RosterUpdate::Joined(id) => println!("{} {}", "+".green(), id),
                RosterUpdate::Left(id) => println!("{} {}", "-".red(), id),
                RosterUpdate::Snapshot(_) => {}
            }
            let online: Vec<String> = owner.roster().iter().map(|(id, _)| id.to_string()).collect();
            println!("{} [{}]", "online:".bold(), online.join(", "));
        }

        CallEvent::Notification(n) => print_notification(n.severity, &n.message),
        CallEvent::RemoteTrackAdded { kind } => {
            println!("{}", format!("Receiving remote {:?}", kind).cyan());
        }
        CallEvent::SignalingConnected => println!("{}", "Connected to relay".green()),
        CallEvent::SignalingDisconnected => warn!("Relay connection lost"),
        CallEvent::MediaToggled { .. } => {}
    }
    Ok(())
}

pub fn print_notification(severity: Severity, message: &str) {
    match severity {
        Severity::Info => println!("{}", message.normal()),
        Severity::Warning => println!("{}", message.yellow()),
        Severity::Error => println!("{}", message.red().bold()),
    }
}
