use crate::support::print_notification;
use anyhow::Result;
use colored::*;
use concierge_call::{CallConfig, CallEvent, CustomerController, SyntheticMediaSource};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: call, mute, video, expand, end, quit";

pub async fn run(config: CallConfig) -> Result<()> {
    let mut customer = CustomerController::connect(&config, Arc::new(SyntheticMediaSource::new()));
    println!(
        "{}",
        format!("Customer {} connecting to {}", customer.id(), config.relay_url).cyan()
    );
    println!("{}", HELP.dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "call" => customer.call().await?,
                    "mute" => customer.toggle_mute().await?,
                    "video" => customer.toggle_video().await?,
                    "expand" => {
                        let expanded = customer.toggle_expanded();
                        println!("panel {}", if expanded { "expanded" } else { "collapsed" });
                    }
                    "end" => customer.end().await?,
                    "quit" => break,
                    "" => {}
                    other => println!("{} {}", format!("unknown command '{}',", other).yellow(), HELP),
                }
            }

            event = customer.next_event() => {
                let Some(event) = event else { break };
                match event {
                    CallEvent::StatusChanged { status, .. } => {
                        println!("{} {:?}", "status:".bold(), status);
                    }
                    CallEvent::MediaToggled { muted, video_enabled } => {
                        println!("muted: {}, video: {}", muted, video_enabled);
                    }
                    CallEvent::RemoteTrackAdded { kind } => {
                        println!("{}", format!("Receiving remote {:?}", kind).cyan());
                    }
                    CallEvent::Notification(n) => print_notification(n.severity, &n.message),
                    CallEvent::SignalingConnected => println!("{}", "Connected to relay".green()),
                    CallEvent::SignalingDisconnected => println!("{}", "Relay connection lost".yellow()),
                    CallEvent::IncomingCall { .. } | CallEvent::Roster(_) => {}
                }
            }
        }
    }

    customer.dispose().await;
    Ok(())
}
