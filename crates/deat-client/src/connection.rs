//! Connection lifecycle management.
//!
//! [`ConnectionManager`] owns at most one live transport connection.
//! All socket work happens in a single supervisor task; the handle side
//! is channel-based, so independent instances (tests, parallel
//! sessions) coexist without shared globals.
//!
//! State machine:
//!
//! ```text
//! Disconnected --connect()--> Connecting --open--> Open
//! Open --close()--> Disconnected                      (no reconnect)
//! Open --peer close / transport error--> Disconnected (one reconnect
//!                                        scheduled after a fixed delay)
//! Open --connect()--> ClosingForReconnect --> Connecting
//! ```
//!
//! Reconnection makes no distinction between a clean peer close and an
//! error: both schedule exactly one retry at the configured fixed
//! delay, reusing the last selected module, indefinitely. An explicit
//! [`ConnectionManager::close`] cancels the pending timer and schedules
//! nothing.

use std::fmt;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use deat_core::{ClientError, Module, Result};
use deat_settings::ClientSettings;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

/// Connection lifecycle state, published on a watch channel for status
/// indicators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport exists.
    #[default]
    Disconnected,
    /// A dial is in progress.
    Connecting,
    /// The transport is open and writable.
    Open,
    /// An open transport is being torn down ahead of a new dial.
    ClosingForReconnect,
}

impl ConnectionState {
    /// Whether sends are currently possible.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "connected",
            Self::ClosingForReconnect => "reconnecting",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Manager handle
// ─────────────────────────────────────────────────────────────────────────────

/// Command message for the supervisor task.
enum Command {
    Connect(Module),
    Close,
    Send(String, oneshot::Sender<Result<()>>),
}

/// Handle to a connection supervisor.
///
/// Dropping the manager drops the command channel, which stops the
/// supervisor and closes any live socket.
pub struct ConnectionManager {
    cmd_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
    _supervisor: JoinHandle<()>,
}

impl ConnectionManager {
    /// Spawn a supervisor task and return its handle.
    ///
    /// Inbound text frames are forwarded to `frame_tx` in arrival
    /// order. The manager starts `Disconnected`; nothing is dialed
    /// until [`connect`](Self::connect).
    #[must_use]
    pub fn spawn(settings: &ClientSettings, frame_tx: mpsc::Sender<String>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let endpoint = Endpoint {
            host: settings.server.host.clone(),
            secure: settings.server.secure,
            dial_timeout: Duration::from_millis(settings.connection.dial_timeout_ms),
        };
        let delay = Duration::from_millis(settings.connection.reconnect_delay_ms);
        let supervisor = tokio::spawn(supervise(cmd_rx, state_tx, frame_tx, endpoint, delay));
        Self {
            cmd_tx,
            state_rx,
            _supervisor: supervisor,
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Subscribe to state transitions (the status surface).
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Connect to the endpoint for `module`, tearing down any existing
    /// connection first. Dial failures are reported through the state
    /// watch and the log, never to the caller.
    pub async fn connect(&self, module: Module) -> Result<()> {
        self.command(Command::Connect(module)).await
    }

    /// Explicit teardown. Cancels any pending reconnect; schedules
    /// nothing.
    pub async fn close(&self) -> Result<()> {
        self.command(Command::Close).await
    }

    /// Transmit an already-encoded frame over the open connection.
    ///
    /// Resolves only after the supervisor has written the frame (or
    /// failed to): a send that races a teardown comes back as
    /// [`ClientError::NotConnected`], never as a silent drop.
    pub async fn send(&self, text: String) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.command(Command::Send(text, ack_tx)).await?;
        ack_rx.await.map_err(|_| ClientError::ChannelClosed)?
    }

    async fn command(&self, cmd: Command) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| ClientError::ChannelClosed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Supervisor
// ─────────────────────────────────────────────────────────────────────────────

struct Endpoint {
    host: String,
    secure: bool,
    dial_timeout: Duration,
}

/// Supervisor loop. Owns the socket exclusively; no other task ever
/// holds a reference that outlives a reconnect.
async fn supervise(
    mut cmd_rx: mpsc::Receiver<Command>,
    state_tx: watch::Sender<ConnectionState>,
    frame_tx: mpsc::Sender<String>,
    endpoint: Endpoint,
    reconnect_delay: Duration,
) {
    let mut socket: Option<WsStream> = None;
    let mut last_module: Option<Module> = None;
    let mut reconnect_at: Option<Instant> = None;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    Command::Connect(module) => {
                        teardown(&mut socket, &state_tx, ConnectionState::ClosingForReconnect)
                            .await;
                        reconnect_at = None;
                        last_module = Some(module);
                        socket = dial(module, &endpoint, &state_tx).await;
                        if socket.is_none() {
                            reconnect_at = Some(Instant::now() + reconnect_delay);
                        }
                    }
                    Command::Close => {
                        info!("explicit close");
                        teardown(&mut socket, &state_tx, ConnectionState::Disconnected).await;
                        reconnect_at = None;
                        set_state(&state_tx, ConnectionState::Disconnected);
                    }
                    Command::Send(text, ack) => {
                        let outcome = if let Some(ws) = socket.as_mut() {
                            match ws.send(Message::Text(text.into())).await {
                                Ok(()) => Ok(()),
                                Err(e) => {
                                    warn!(error = %e, "send failed, scheduling reconnect");
                                    socket = None;
                                    set_state(&state_tx, ConnectionState::Disconnected);
                                    reconnect_at = Some(Instant::now() + reconnect_delay);
                                    Err(ClientError::Transport(e.to_string()))
                                }
                            }
                        } else {
                            // A send that raced a teardown; the caller must
                            // hear about it, not assume the frame went out.
                            warn!("rejecting send with no open connection");
                            Err(ClientError::NotConnected)
                        };
                        let _ = ack.send(outcome);
                    }
                }
            }

            msg = next_frame(socket.as_mut()), if socket.is_some() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if frame_tx.send(text.to_string()).await.is_err() {
                            // Receiver side is gone; nothing left to render for.
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("connection closed by peer, scheduling reconnect");
                        socket = None;
                        set_state(&state_tx, ConnectionState::Disconnected);
                        reconnect_at = Some(Instant::now() + reconnect_delay);
                    }
                    Some(Ok(_)) => {} // ping/pong/binary: ignored
                    Some(Err(e)) => {
                        warn!(error = %e, "transport error, scheduling reconnect");
                        socket = None;
                        set_state(&state_tx, ConnectionState::Disconnected);
                        reconnect_at = Some(Instant::now() + reconnect_delay);
                    }
                }
            }

            () = sleep_until_opt(reconnect_at), if reconnect_at.is_some() => {
                reconnect_at = None;
                if let Some(module) = last_module {
                    info!(%module, "reconnect timer fired");
                    socket = dial(module, &endpoint, &state_tx).await;
                    if socket.is_none() {
                        reconnect_at = Some(Instant::now() + reconnect_delay);
                    }
                }
            }
        }
    }

    // Handle dropped: best-effort close of whatever is still live.
    if let Some(mut ws) = socket.take() {
        let _ = ws.close(None).await;
    }
}

/// Dial the module's endpoint. Returns the socket on success; on
/// failure logs the transport error and leaves the state `Disconnected`
/// (the caller schedules the retry).
///
/// The dial is bounded by the configured timeout so a black-hole host
/// cannot wedge the supervisor; a queued `close()` waits at most that
/// long.
async fn dial(
    module: Module,
    endpoint: &Endpoint,
    state_tx: &watch::Sender<ConnectionState>,
) -> Option<WsStream> {
    let url = module.endpoint_url(endpoint.secure, &endpoint.host);
    set_state(state_tx, ConnectionState::Connecting);
    debug!(%url, "connecting");
    match tokio::time::timeout(endpoint.dial_timeout, connect_async(&url)).await {
        Ok(Ok((ws, _response))) => {
            info!(%module, "connected");
            set_state(state_tx, ConnectionState::Open);
            Some(ws)
        }
        Ok(Err(e)) => {
            warn!(%module, error = %e, "connect failed");
            set_state(state_tx, ConnectionState::Disconnected);
            None
        }
        Err(_) => {
            warn!(%module, timeout = ?endpoint.dial_timeout, "connect timed out");
            set_state(state_tx, ConnectionState::Disconnected);
            None
        }
    }
}

/// Tear down the socket if one exists, passing through `interim` while
/// the closing handshake runs.
async fn teardown(
    socket: &mut Option<WsStream>,
    state_tx: &watch::Sender<ConnectionState>,
    interim: ConnectionState,
) {
    if let Some(mut ws) = socket.take() {
        set_state(state_tx, interim);
        let _ = ws.close(None).await;
    }
}

fn set_state(state_tx: &watch::Sender<ConnectionState>, state: ConnectionState) {
    debug!(%state, "connection state");
    let _ = state_tx.send(state);
}

/// Sleep until the reconnect deadline, or park forever when none is
/// scheduled (the select guard keeps this branch disabled in that case).
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Read the next inbound message, or park forever when no socket
/// exists (the select guard keeps this branch disabled in that case).
async fn next_frame(
    socket: Option<&mut WsStream>,
) -> Option<std::result::Result<Message, tokio_tungstenite::tungstenite::Error>> {
    match socket {
        Some(ws) => ws.next().await,
        None => std::future::pending().await,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_default_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn state_is_open_only_for_open() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(!ConnectionState::Disconnected.is_open());
        assert!(!ConnectionState::ClosingForReconnect.is_open());
    }

    #[test]
    fn state_display_preserves_connected_semantics() {
        assert_eq!(ConnectionState::Open.to_string(), "connected");
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
    }

    #[tokio::test]
    async fn manager_starts_disconnected() {
        let (frame_tx, _frame_rx) = mpsc::channel(8);
        let manager = ConnectionManager::spawn(&ClientSettings::default(), frame_tx);
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn send_without_connection_is_rejected_not_dropped() {
        let (frame_tx, _frame_rx) = mpsc::channel(8);
        let manager = ConnectionManager::spawn(&ClientSettings::default(), frame_tx);
        let err = manager.send("{}".to_string()).await.unwrap_err();
        assert_eq!(err, ClientError::NotConnected);
    }

    #[tokio::test]
    async fn independent_managers_have_independent_state() {
        let (tx_a, _rx_a) = mpsc::channel(8);
        let (tx_b, _rx_b) = mpsc::channel(8);
        let a = ConnectionManager::spawn(&ClientSettings::default(), tx_a);
        let b = ConnectionManager::spawn(&ClientSettings::default(), tx_b);
        assert_eq!(a.state(), ConnectionState::Disconnected);
        assert_eq!(b.state(), ConnectionState::Disconnected);
    }
}
