//! Session state and the submit/receive pipeline.
//!
//! A [`Session`] tracks the currently selected module and variant, the
//! editable payload text, and the requests still in flight. It mediates
//! between front-end actions and the [`ConnectionManager`], and runs the
//! frame pump that turns service replies into rows on the [`ResultLog`].
//!
//! The service attaches no correlation identifier to replies, so
//! in-flight requests are matched to responses by arrival order through
//! a local FIFO of request contexts. That still pins each row's label to
//! the module/variant active at *send* time, which is the guarantee the
//! renderer needs. The FIFO is flushed whenever the connection drops —
//! those requests can no longer be answered, and their contexts must
//! not shift the labeling of replies on the next connection.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use deat_core::{
    ClientError, Envelope, Module, RequestContext, Result, ResultRow, Variant, decode_frame,
    parse_payload,
};
use deat_settings::ClientSettings;

use crate::connection::{ConnectionManager, ConnectionState};
use crate::presets;
use crate::render::ResultLog;

/// Mutable selection state, guarded together.
struct Selection {
    module: Module,
    variant: Variant,
    payload_text: String,
}

/// One client session: selection state, connection handle, pending
/// requests, and the result log.
pub struct Session {
    manager: ConnectionManager,
    log: Arc<ResultLog>,
    include_module_field: bool,
    selection: RwLock<Selection>,
    pending: Mutex<VecDeque<RequestContext>>,
}

impl Session {
    /// Create a session and start its frame pump.
    ///
    /// The session starts on `ARC – A` with the matching preset loaded,
    /// but does not connect until [`select_module`](Self::select_module)
    /// is called — construction is explicit and side-effect free on the
    /// network.
    #[must_use]
    pub fn spawn(settings: &ClientSettings) -> Arc<Self> {
        let (frame_tx, frame_rx) = mpsc::channel(settings.connection.frame_buffer);
        let manager = ConnectionManager::spawn(settings, frame_tx);

        let session = Arc::new(Self {
            manager,
            log: Arc::new(ResultLog::new()),
            include_module_field: settings.connection.include_module_field,
            selection: RwLock::new(Selection {
                module: Module::Arc,
                variant: Variant::A,
                payload_text: presets::preset_text(Module::Arc, Variant::A),
            }),
            pending: Mutex::new(VecDeque::new()),
        });

        // The pump holds a weak reference so dropping the session tears
        // everything down: manager drop stops the supervisor, which
        // closes the frame channel, which ends the pump.
        let weak = Arc::downgrade(&session);
        drop(tokio::spawn(pump_frames(weak, frame_rx)));

        // In-flight requests die with their connection: a reply on the
        // next one must never be matched to a context from the last.
        let weak = Arc::downgrade(&session);
        let mut state_rx = session.manager.watch_state();
        drop(tokio::spawn(async move {
            while state_rx.changed().await.is_ok() {
                if !state_rx.borrow_and_update().is_open() {
                    let Some(session) = weak.upgrade() else { break };
                    session.pending.lock().clear();
                }
            }
        }));

        session
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Currently selected module.
    #[must_use]
    pub fn current_module(&self) -> Module {
        self.selection.read().module
    }

    /// Currently selected variant.
    #[must_use]
    pub fn current_variant(&self) -> Variant {
        self.selection.read().variant
    }

    /// The editable pending payload text.
    #[must_use]
    pub fn payload_text(&self) -> String {
        self.selection.read().payload_text.clone()
    }

    /// Replace the pending payload text (the user edited the field).
    pub fn set_payload_text(&self, text: impl Into<String>) {
        self.selection.write().payload_text = text.into();
    }

    /// Select a module: reload the preset for the current variant and
    /// (re)connect to the module's endpoint.
    pub async fn select_module(&self, module: Module) -> Result<()> {
        {
            let mut sel = self.selection.write();
            sel.module = module;
            sel.payload_text = presets::preset_text(module, sel.variant);
        }
        self.manager.connect(module).await
    }

    /// Select a variant: reload the preset. Does not reconnect — the
    /// variant only affects the default payload content.
    pub fn select_variant(&self, variant: Variant) {
        let mut sel = self.selection.write();
        sel.variant = variant;
        sel.payload_text = presets::preset_text(sel.module, variant);
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Validate and transmit payload text.
    ///
    /// Fails with [`ClientError::InvalidUserJson`] before anything else
    /// happens, and with [`ClientError::NotConnected`] when no open
    /// connection exists; in both cases nothing is transmitted.
    pub async fn submit(&self, text: &str) -> Result<()> {
        let payload = parse_payload(text)?;
        if !self.manager.state().is_open() {
            return Err(ClientError::NotConnected);
        }

        let (module, variant) = {
            let sel = self.selection.read();
            (sel.module, sel.variant)
        };
        let envelope = if self.include_module_field {
            Envelope::with_module(payload, module)
        } else {
            Envelope::new(payload)
        };

        let ctx = RequestContext {
            module,
            variant,
            payload_text: text.trim().to_string(),
        };
        self.pending.lock().push_back(ctx);

        if let Err(e) = self.manager.send(envelope.encode()).await {
            let _ = self.pending.lock().pop_back();
            return Err(e);
        }
        self.selection.write().payload_text = text.trim().to_string();
        Ok(())
    }

    /// Submit the pending payload text as-is.
    pub async fn submit_pending(&self) -> Result<()> {
        let text = self.payload_text();
        self.submit(&text).await
    }

    // ── Connection surface ───────────────────────────────────────────

    /// Current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Subscribe to connection state transitions.
    #[must_use]
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.manager.watch_state()
    }

    /// Explicitly close the connection (no reconnect is scheduled).
    pub async fn close(&self) -> Result<()> {
        self.manager.close().await
    }

    // ── Results ──────────────────────────────────────────────────────

    /// The append-only result log.
    #[must_use]
    pub fn log(&self) -> &Arc<ResultLog> {
        &self.log
    }

    /// Decode one inbound frame and append its row, or drop it.
    fn handle_frame(&self, raw: &str) {
        match decode_frame(raw) {
            Ok(result) => {
                let ctx = self
                    .pending
                    .lock()
                    .pop_front()
                    .unwrap_or_else(|| self.current_context());
                let row = ResultRow::build(&result, &ctx);
                debug!(label = %row.label, band = %row.band, "result row");
                self.log.append(row);
            }
            Err(e) => {
                // Dropped frame: connection stays open, no row appears.
                warn!(error = %e, frame = raw, "dropping malformed frame");
            }
        }
    }

    /// Context for an unsolicited frame with no pending request.
    fn current_context(&self) -> RequestContext {
        let sel = self.selection.read();
        RequestContext {
            module: sel.module,
            variant: sel.variant,
            payload_text: sel.payload_text.clone(),
        }
    }
}

/// Frame pump: raw inbound frames to rendered rows, in arrival order.
async fn pump_frames(session: Weak<Session>, mut frame_rx: mpsc::Receiver<String>) {
    while let Some(raw) = frame_rx.recv().await {
        let Some(session) = session.upgrade() else {
            break;
        };
        session.handle_frame(&raw);
    }
    debug!("frame pump ended");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn submit_invalid_json_is_rejected_locally() {
        let session = Session::spawn(&ClientSettings::default());
        let err = session.submit("{not json").await.unwrap_err();
        assert_matches!(err, ClientError::InvalidUserJson(_));
        // nothing was queued for correlation either
        assert!(session.pending.lock().is_empty());
    }

    #[tokio::test]
    async fn submit_while_disconnected_is_not_connected() {
        let session = Session::spawn(&ClientSettings::default());
        let err = session.submit(r#"{"x":1}"#).await.unwrap_err();
        assert_eq!(err, ClientError::NotConnected);
        assert!(session.pending.lock().is_empty());
    }

    #[tokio::test]
    async fn select_variant_reloads_preset_without_reconnect() {
        let session = Session::spawn(&ClientSettings::default());
        let before = session.payload_text();
        session.select_variant(Variant::B);
        assert_eq!(session.current_variant(), Variant::B);
        assert_ne!(session.payload_text(), before);
        // still never connected
        assert_eq!(
            session.connection_state(),
            ConnectionState::Disconnected
        );
    }

    #[tokio::test]
    async fn handle_frame_renders_against_pending_context() {
        let session = Session::spawn(&ClientSettings::default());
        session.pending.lock().push_back(RequestContext {
            module: Module::Cr,
            variant: Variant::B,
            payload_text: "{}".into(),
        });
        session.handle_frame(r#"{"module":"CR","result":{"metric":"risk","value":0.9}}"#);
        let rows = session.log().rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "CR – B");
    }

    #[tokio::test]
    async fn handle_frame_drops_malformed_without_row() {
        let session = Session::spawn(&ClientSettings::default());
        session.handle_frame("garbage");
        assert!(session.log().is_empty());
    }

    #[tokio::test]
    async fn unsolicited_frame_uses_current_selection() {
        let session = Session::spawn(&ClientSettings::default());
        session.select_variant(Variant::B);
        session.handle_frame(r#"{"metric":"score","value":0.1}"#);
        let rows = session.log().rows();
        assert_eq!(rows[0].label, "ARC – B");
    }
}
