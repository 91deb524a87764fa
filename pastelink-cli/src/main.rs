use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use pastelink::events::{Call, EventBusOptions, Listener, Registration};
use pastelink::model::IceServerConfig;
use pastelink::peer::{ConnectionManager, PeerBus, PeerEvent, PeerSignal};
use pastelink::PeerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const OPEN_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "pastelink")]
#[command(about = "Peer-to-peer chat over WebRTC with copy-paste signaling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// STUN/TURN server URL. Repeat for several; defaults to Google STUN.
    #[arg(long = "ice-server", global = true)]
    ice_servers: Vec<String>,

    /// Print uncompressed tokens.
    #[arg(long, global = true)]
    raw: bool,

    #[arg(long, global = true, default_value = "data")]
    label: String,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a connection and print the offer token.
    Offer,
    /// Answer an offer token, read from the prompt when omitted.
    Answer { token: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = PeerConfig {
        channel_label: cli.label.clone(),
        compress_tokens: !cli.raw,
        ..PeerConfig::default()
    };
    if !cli.ice_servers.is_empty() {
        config.ice_servers = cli.ice_servers.iter().map(IceServerConfig::new).collect();
    }

    let bus = PeerBus::create(EventBusOptions {
        log: cli.verbose,
        alias: config.bus_alias.clone(),
        global: true,
    });
    let manager = ConnectionManager::with_bus(config.clone(), bus)
        .await
        .context("Failed to create peer connection")?;
    attach_printer(&config.bus_alias)?;
    debug!("Peer ready, {} ICE server(s)", config.ice_servers.len());

    match cli.command {
        Commands::Offer => {
            let offer = manager.create_offer().await.context("Failed to create offer")?;
            print_token("Offer", &offer);

            let answer = prompt_token("Paste the answer token").await?;
            debug!("Read answer token ({} chars)", answer.len());
            manager
                .apply_answer(&answer)
                .await
                .context("Failed to apply answer")?;
        }
        Commands::Answer { token } => {
            let offer = match token {
                Some(token) => token,
                None => prompt_token("Paste the offer token").await?,
            };
            debug!("Read offer token ({} chars)", offer.len());
            let answer = manager
                .apply_offer(&offer)
                .await
                .context("Failed to apply offer")?;
            print_token("Answer", &answer);
        }
    }

    println!("{}", "⏳ Waiting for the data channel...".cyan());
    tokio::time::timeout(OPEN_TIMEOUT, manager.wait_open())
        .await
        .context("Timed out waiting for the data channel")??;
    println!(
        "{}",
        "✨ Connected. Type a message and press enter, /quit to leave."
            .green()
            .bold()
    );

    let result = chat(&manager).await;
    manager.close().await.context("Failed to close connection")?;
    result
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Prints inbound messages and connection loss. Finds the bus by alias, the
/// same way any other component of the process would.
fn attach_printer(alias: &str) -> Result<()> {
    let bus = PeerBus::global(alias).context("Peer event bus is not registered")?;

    let on_message = Listener::new(|call: Call<'_, PeerSignal>| {
        if let Some(payload) = call.arg(0).and_then(PeerSignal::as_payload) {
            println!("{} {}", "Peer:".magenta().bold(), payload);
        }
        Ok(())
    });
    let on_disconnected = Listener::new(|_: Call<'_, PeerSignal>| {
        println!("{}", "⚠️  Peer disconnected".yellow());
        Ok(())
    });

    bus.on([
        (PeerEvent::Message, Registration::new(on_message)),
        (PeerEvent::Disconnected, Registration::new(on_disconnected)),
    ]);
    Ok(())
}

fn print_token(kind: &str, token: &str) {
    println!("{}", format!("📋 {kind} token ({} chars), send it to your peer:", token.len()).cyan());
    println!("{token}");
}

async fn prompt_token(prompt: &'static str) -> Result<String> {
    let token = tokio::task::spawn_blocking(move || {
        Input::<String>::new().with_prompt(prompt).interact_text()
    })
    .await
    .context("Prompt task failed")?
    .context("Failed to read token")?;
    Ok(token.trim().to_owned())
}

async fn chat(manager: &ConnectionManager) -> Result<()> {
    let disconnected = manager.events().wait(PeerEvent::Disconnected);
    tokio::pin!(disconnected);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = &mut disconnected => {
                debug!("Leaving chat: peer disconnected");
                return Ok(());
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    return Ok(());
                };
                if line.trim() == "/quit" {
                    return Ok(());
                }
                if line.is_empty() {
                    continue;
                }
                manager.send(line).await.context("Failed to send message")?;
            }
        }
    }
}
