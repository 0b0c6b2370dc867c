//! Transport-agnostic RPC subsystem.
//!
//! JSON-array RPC between the charge point and the central system. Both
//! sides may initiate Calls; every Call is answered by exactly one
//! CallResult or CallError carrying the same unique id.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         RPC Stack                            │
//! │                                                              │
//! │  ┌───────────┐   ┌───────────┐   ┌────────────────────────┐  │
//! │  │ Transport │──▶│  Stream   │──▶│ Envelope (Message)     │  │
//! │  │ (trait)   │   │ (buffers) │   │  Call ──▶ Dispatcher   │  │
//! │  └───────────┘   └───────────┘   │  Result/Error ──▶      │  │
//! │       ▲                          │          RpcClient     │  │
//! │       │                          └────────────────────────┘  │
//! │       │          ┌───────────┐              │                │
//! │       └──────────│  Stream   │◀─────────────┘                │
//! │                  │ (writer)  │   (typed Calls and replies)   │
//! │                  └───────────┘                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod dispatch;
pub mod envelope;
pub mod stream;
pub mod transport;

pub use client::{ResponseHandle, Resolution, RpcClient};
pub use dispatch::{Dispatcher, Reply};
pub use envelope::{CallError, ErrorCode, Message, UniqueId};

use crate::codec::Record;

/// A Call payload type bound to its action name and response type.
pub trait Request: Record {
    const ACTION: &'static str;
    type Response: Record + Send + 'static;
}
