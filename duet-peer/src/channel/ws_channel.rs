use crate::channel::SignalingChannel;
use crate::error::ChannelError;
use async_trait::async_trait;
use duet_core::{ClientMessage, RelayMessage};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Owns the reader and writer tasks of one WebSocket and aborts both when
/// dropped.
struct Subscription {
    tasks: Vec<JoinHandle<()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// JSON-over-WebSocket link to a `duet` relay.
pub struct WsSignalingChannel {
    outbound: mpsc::UnboundedSender<Message>,
    inbound: mpsc::UnboundedReceiver<RelayMessage>,
    _subscription: Subscription,
}

impl WsSignalingChannel {
    pub async fn connect(url: &str) -> Result<Self, ChannelError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ChannelError::Connect {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
        info!("Connected to relay at {}", url);

        let (mut sink, mut source) = stream.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();

        let writer = tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                if let Err(e) = sink.send(msg).await {
                    warn!("Relay write failed: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader = tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                let text = match frame {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Relay read failed: {}", e);
                        break;
                    }
                };

                match serde_json::from_str::<RelayMessage>(text.as_str()) {
                    Ok(msg) => {
                        debug!("Relay -> {}", msg.event_name());
                        if inbound_tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(
                        "Dropping unparseable relay message: {} ({})",
                        e,
                        text.as_str()
                    ),
                }
            }
            info!("Relay connection closed");
        });

        Ok(Self {
            outbound,
            inbound,
            _subscription: Subscription {
                tasks: vec![writer, reader],
            },
        })
    }
}

#[async_trait]
impl SignalingChannel for WsSignalingChannel {
    async fn send(&mut self, msg: ClientMessage) -> Result<(), ChannelError> {
        let json = serde_json::to_string(&msg).map_err(|e| ChannelError::Encode(e.to_string()))?;
        debug!("{} -> relay", msg.event_name());
        self.outbound
            .send(Message::text(json))
            .map_err(|_| ChannelError::Closed)
    }

    async fn recv(&mut self) -> Option<RelayMessage> {
        self.inbound.recv().await
    }
}
