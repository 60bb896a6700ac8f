//! Server-Sent Events (SSE) core: a shared value that changes over time and
//! the per-client sessions that push each change to their client.
//!
//! # Architecture
//!
//! - **Shared value cell** ([`ValueCell`]): the single piece of shared mutable
//!   state. It holds the latest value together with its serialized form and
//!   is created once at startup, then handed to the refresh task and the
//!   session manager.
//! - **Refresh task** ([`RefreshTask`]): asks a [`ValueSource`] for a new
//!   value on a fixed period and installs it into the cell. A failed tick is
//!   logged and skipped; the previous value stays published.
//! - **Stream sessions** ([`StreamSession`]): one per connected client. A
//!   session compares the cell against the last value it pushed, pushes the
//!   value when it differs, and otherwise sleeps until the cell changes.
//! - **Manager** ([`Manager`]): opens sessions and tracks them in a
//!   [`connection::ConnectionRegistry`].
//!
//! # Delivery
//!
//! - Only the latest value is retained, so late joiners receive the current
//!   value first and never any history.
//! - Values are compared by their serialized text. Installing an equal value
//!   wakes nobody and is never pushed twice.
//! - Within a session, pushes follow the order in which values were observed.
//!   Nothing is promised across sessions.
//!
//! # Modules
//!
//! - `cell`: `ValueCell` and `Snapshot`
//! - `connection`: session registry with type-safe `ConnectionId`
//! - `manager`: session factory bound to one cell
//! - `refresh`: periodic refresh task
//! - `session`: per-client change detection and push stream
//! - `source`: built-in value sources

pub mod cell;
pub mod connection;
pub mod error;
pub mod manager;
pub mod refresh;
pub mod session;
pub mod source;

pub use cell::{Snapshot, ValueCell};
pub use manager::Manager;
pub use refresh::RefreshTask;
pub use session::StreamSession;
pub use source::ValueSource;
