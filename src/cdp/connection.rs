//! CDP WebSocket connection implementation
//!
//! JSON-RPC over a WebSocket: commands are id-correlated with their
//! responses through oneshot channels, and a background read loop owns the
//! receiving half of the stream. Unsolicited protocol notifications are
//! drained and dropped; nothing in the harness consumes push events.

use crate::cdp::traits::{CdpConnection, CdpErrorInfo, CdpResponse};
use crate::cdp::types::{CdpNotification, CdpRequest, CdpRpcResponse};
use crate::Error;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<CdpResponse>>>>;

/// Default deadline for a single command round-trip
const DEFAULT_COMMAND_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// CDP WebSocket connection implementation
#[derive(Debug)]
pub struct CdpWebSocketConnection {
    /// WebSocket URL (for diagnostics)
    url: String,
    /// Sending half of the stream
    sink: Mutex<WsSink>,
    /// Next command ID
    next_id: AtomicU64,
    /// Pending commands (ID -> response sender)
    pending: PendingMap,
    /// Is connection active
    is_active: Arc<AtomicBool>,
    /// Per-command deadline
    command_timeout: std::time::Duration,
}

impl CdpWebSocketConnection {
    /// Connect to a CDP WebSocket endpoint
    ///
    /// # Arguments
    /// * `url` - target WebSocket URL
    ///   (e.g., "ws://localhost:9222/devtools/page/ABC123")
    pub async fn connect<S: Into<String>>(url: S) -> Result<Arc<Self>, Error> {
        let url = url.into();
        info!("Connecting to CDP WebSocket: {}", url);

        let (ws_stream, _) = connect_async(&url)
            .await
            .map_err(|e| Error::websocket(format!("Failed to connect to {}: {}", url, e)))?;

        let (sink, source) = ws_stream.split();

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let is_active = Arc::new(AtomicBool::new(true));

        let connection = Arc::new(Self {
            url,
            sink: Mutex::new(sink),
            next_id: AtomicU64::new(1),
            pending: Arc::clone(&pending),
            is_active: Arc::clone(&is_active),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        });

        tokio::spawn(Self::read_loop(source, pending, is_active));

        Ok(connection)
    }

    /// Read loop: dispatch responses to their waiters, drop notifications
    async fn read_loop(mut source: WsSource, pending: PendingMap, is_active: Arc<AtomicBool>) {
        while let Some(message) = source.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    Self::handle_message(&text, &pending).await;
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket close frame received");
                    break;
                }
                Ok(_) => {
                    // Ping/pong and binary frames are handled by the stack
                }
                Err(e) => {
                    warn!("WebSocket read error: {}", e);
                    break;
                }
            }
        }

        is_active.store(false, Ordering::SeqCst);

        // Fail anything still waiting so callers see a closed connection
        // instead of a timeout.
        let mut pending = pending.lock().await;
        for (id, sender) in pending.drain() {
            let _ = sender.send(CdpResponse {
                id,
                result: None,
                error: Some(CdpErrorInfo {
                    code: -1,
                    message: "connection closed".to_string(),
                }),
            });
        }
    }

    /// Route one incoming frame
    async fn handle_message(text: &str, pending: &PendingMap) {
        if let Ok(response) = serde_json::from_str::<CdpRpcResponse>(text) {
            let waiter = pending.lock().await.remove(&response.id);
            match waiter {
                Some(sender) => {
                    let _ = sender.send(CdpResponse {
                        id: response.id,
                        result: Some(response.result),
                        error: response.error.map(|e| CdpErrorInfo {
                            code: e.code,
                            message: e.message,
                        }),
                    });
                }
                None => warn!("Response for unknown command ID: {}", response.id),
            }
            return;
        }

        if let Ok(notification) = serde_json::from_str::<CdpNotification>(text) {
            debug!("Dropping CDP notification: {}", notification.method);
            return;
        }

        warn!("Unknown CDP message format: {}", text);
    }
}

#[async_trait]
impl CdpConnection for CdpWebSocketConnection {
    async fn send_command(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::websocket(format!(
                "Connection to {} is not active",
                self.url
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
            session_id: None,
        };

        let json = serde_json::to_string(&request)?;
        debug!("Sending CDP command {}: {}", id, method);

        let (sender, receiver) = oneshot::channel();
        self.pending.lock().await.insert(id, sender);

        {
            let mut sink = self.sink.lock().await;
            if let Err(e) = sink.send(Message::Text(json)).await {
                self.pending.lock().await.remove(&id);
                return Err(Error::websocket(format!("Failed to send command: {}", e)));
            }
        }

        match tokio::time::timeout(self.command_timeout, receiver).await {
            Ok(Ok(response)) => {
                if let Some(err) = &response.error {
                    return Err(Error::cdp(format!(
                        "{} failed: {} (code {})",
                        method, err.message, err.code
                    )));
                }
                Ok(response)
            }
            Ok(Err(_)) => Err(Error::websocket(format!(
                "Response channel for command {} dropped",
                id
            ))),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(Error::cdp(format!(
                    "Command {} ({}) timed out after {:?}",
                    id, method, self.command_timeout
                )))
            }
        }
    }

    async fn close(&self) -> Result<(), Error> {
        info!("Closing CDP WebSocket connection to {}", self.url);

        self.is_active.store(false, Ordering::SeqCst);

        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.send(Message::Close(None)).await {
            // The peer may have gone first; closing an already-closed
            // connection is not a failure worth surfacing.
            debug!("Close frame send failed: {}", e);
        }

        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}
