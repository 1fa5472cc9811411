//! # deat-core
//!
//! Foundation types for the DEAT survival-engine client.
//!
//! This crate provides the shared vocabulary the transport and front-end
//! crates depend on:
//!
//! - **Identifiers**: [`Module`] and [`Variant`] with case-insensitive
//!   parsing and canonical uppercase wire form
//! - **Wire codec**: [`Envelope`] encoding and [`ModuleResult`] decoding
//!   covering every frame shape the service has been observed to emit
//! - **Rendering**: [`ResultRow`] construction and [`SeverityBand`]
//!   classification
//! - **Errors**: [`ClientError`] taxonomy via `thiserror`
//!
//! Everything here is synchronous and runtime-free; the transport lives
//! in `deat-client`.

#![deny(unsafe_code)]

pub mod errors;
pub mod module;
pub mod render;
pub mod wire;

pub use errors::{ClientError, Result};
pub use module::{Module, Variant};
pub use render::{RequestContext, ResultRow, SeverityBand};
pub use wire::{Envelope, ModuleResult, decode_frame, parse_payload};
