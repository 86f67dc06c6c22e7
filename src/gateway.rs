use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use spark_chat::protocol::InboundMessage;

/// Bridge events for the app layer.
#[derive(Debug)]
pub enum BridgeEvent {
    Connected,
    Disconnected,
    Inbound(InboundMessage),
}

/// Talk to the bridge over one websocket connection. Parsed messages go out
/// through `tx`; request JSON strings arrive on `out_rx`. `connected` mirrors
/// whether outbound sends can currently be delivered.
///
/// There is no reconnect: once the socket closes the session stays offline.
pub async fn connect(
    bridge_url: String,
    tx: mpsc::UnboundedSender<BridgeEvent>,
    mut out_rx: mpsc::UnboundedReceiver<String>,
    connected: Arc<AtomicBool>,
) {
    info!(url = %bridge_url, "connecting to bridge");

    let ws_stream = match connect_async(&bridge_url).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            warn!(error = %e, "could not connect to bridge");
            let _ = tx.send(BridgeEvent::Disconnected);
            return;
        }
    };

    info!("bridge connected");
    connected.store(true, Ordering::Relaxed);
    let _ = tx.send(BridgeEvent::Connected);
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    loop {
        tokio::select! {
            // Incoming WebSocket messages
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match InboundMessage::parse(&text) {
                            Ok(inbound) => {
                                let _ = tx.send(BridgeEvent::Inbound(inbound));
                            }
                            Err(e) => {
                                debug!(error = %e, "ignoring malformed bridge message");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_tx.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("bridge sent close frame");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "websocket read error");
                        break;
                    }
                    None => {
                        info!("websocket stream ended");
                        break;
                    }
                }
            }
            // Outgoing requests from the session
            Some(out_msg) = out_rx.recv() => {
                if let Err(e) = ws_tx.send(Message::Text(out_msg.into())).await {
                    warn!(error = %e, "failed to send request to bridge");
                    break;
                }
            }
        }
    }

    connected.store(false, Ordering::Relaxed);
    let _ = tx.send(BridgeEvent::Disconnected);
    info!("disconnected from bridge");
}
