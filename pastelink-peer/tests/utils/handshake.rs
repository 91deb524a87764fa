use anyhow::{Context, Result};
use pastelink_core::PeerConfig;
use pastelink_peer::ConnectionManager;
use std::time::Duration;

/// Timeout for one side's token generation, ICE gathering included (ms).
pub const TOKEN_TIMEOUT_MS: u64 = 10000;

/// Timeout for the data channel to open after the answer is applied (ms).
pub const DATA_CHANNEL_TIMEOUT_MS: u64 = 10000;

/// Timeout for a message to cross the data channel (ms).
pub const MESSAGE_TIMEOUT_MS: u64 = 5000;

/// Timeout for the remaining side to notice its peer is gone (ms). Covers
/// the ICE disconnect timeout.
pub const DISCONNECT_TIMEOUT_MS: u64 = 20000;

/// A manager using host candidates only.
pub async fn new_peer(alias: &str) -> Result<ConnectionManager> {
    let config = PeerConfig {
        bus_alias: alias.to_owned(),
        ..PeerConfig::local()
    };
    ConnectionManager::new(config)
        .await
        .context("Failed to create connection manager")
}

/// Runs the whole manual exchange: offer from `offerer`, answer from
/// `answerer`, then waits until both sides can write.
pub async fn connect_pair(offerer: &ConnectionManager, answerer: &ConnectionManager) -> Result<()> {
    let offer = with_timeout(TOKEN_TIMEOUT_MS, offerer.create_offer())
        .await
        .context("Offer timed out")?
        .context("Failed to create offer")?;
    tracing::debug!("[Handshake] Offer token: {} chars", offer.len());

    let answer = with_timeout(TOKEN_TIMEOUT_MS, answerer.apply_offer(&offer))
        .await
        .context("Answer timed out")?
        .context("Failed to apply offer")?;
    tracing::debug!("[Handshake] Answer token: {} chars", answer.len());

    offerer
        .apply_answer(&answer)
        .await
        .context("Failed to apply answer")?;

    with_timeout(DATA_CHANNEL_TIMEOUT_MS, offerer.wait_open())
        .await
        .context("Offerer channel did not open")??;
    with_timeout(DATA_CHANNEL_TIMEOUT_MS, answerer.wait_open())
        .await
        .context("Answerer channel did not open")??;

    Ok(())
}

pub async fn with_timeout<F: std::future::Future>(
    timeout_ms: u64,
    future: F,
) -> Result<F::Output, tokio::time::error::Elapsed> {
    tokio::time::timeout(Duration::from_millis(timeout_ms), future).await
}
