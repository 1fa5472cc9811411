//! # deat-client
//!
//! Session and message-exchange layer for the DEAT survival-engine
//! service.
//!
//! The service exposes named analytical modules (ARC, CR, NUR) over
//! per-module WebSocket endpoints. This crate owns the transport side of
//! the client:
//!
//! - [`ConnectionManager`]: one supervisor task per instance owning at
//!   most one live socket, with the connect/close/auto-reconnect state
//!   machine
//! - [`Session`]: current module/variant selection, pre-send validation,
//!   and the frame pump that turns replies into result rows
//! - [`ResultLog`]: the append-only row log with a bring-into-view
//!   signal for front ends
//! - [`presets`]: the static default-payload catalog
//!
//! Codec and row construction live in `deat-core`; this crate wires them
//! to tokio and `tokio-tungstenite`.

#![deny(unsafe_code)]

pub mod connection;
pub mod presets;
pub mod render;
pub mod session;

pub use connection::{ConnectionManager, ConnectionState};
pub use render::ResultLog;
pub use session::Session;
