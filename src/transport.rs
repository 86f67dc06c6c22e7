use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::ChatError;

/// Byte-oriented outbound channel to the bridge.
pub trait Transport {
    /// Queue `payload` for delivery. An error means nothing was queued.
    fn send(&mut self, payload: &str) -> Result<(), ChatError>;
}

/// Hands requests to the connection task over an unbounded channel.
///
/// The connection task flips `connected`; sending while it is down fails
/// instead of queueing a request nobody will deliver.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    out_tx: mpsc::UnboundedSender<String>,
    connected: Arc<AtomicBool>,
}

impl ChannelTransport {
    pub fn new(out_tx: mpsc::UnboundedSender<String>, connected: Arc<AtomicBool>) -> Self {
        Self { out_tx, connected }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, payload: &str) -> Result<(), ChatError> {
        if !self.is_connected() {
            return Err(ChatError::Transport("bridge not connected".into()));
        }
        self.out_tx
            .send(payload.to_string())
            .map_err(|e| ChatError::Transport(e.to_string()))
    }
}
