//! # fcp-client - High-level client for content-addressed storage nodes
//!
//! This crate gives applications call/return operations over a node link
//! whose protocol is asynchronous and multiplexed: a request is sent, any
//! number of status messages may follow, and the completion arrives later,
//! out of order with other requests, on the connection's dispatch thread.
//!
//! ## Architecture Overview
//!
//! 1. **Connection** ([`Connection`]): owns the link and routes responses to
//!    per-request listeners. The wire format lives behind this trait.
//! 2. **Correlator** ([`correlator::Correlator`]): one in-flight request per
//!    client, a one-shot channel per submission, indefinite fixed backoff
//!    while no node is reachable.
//! 3. **Operations** ([`FcpClient`]): fetch with redirect following, key-pair
//!    generation, insert, and slot-allocating insert.
//!
//! ## Failure Model
//!
//! - No node reachable: retried forever with a fixed delay, never surfaced
//! - Link permanently closed: [`ClientError::ConnectionClosed`] from every
//!   current and later call
//! - Unreadable payload: [`ClientError::BadInput`], nothing is sent
//! - Node-side fetch failure: [`ClientError::FetchFailed`] with the response
//! - Node-side insert failure: [`InsertOutcome::Failed`] with a cause code
//!
//! ## Usage
//!
//! ```rust
//! use fcp_client::{FcpClient, MemoryConnection, SlotInsertOutcome};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let node = Arc::new(MemoryConnection::new()?);
//!     node.store("KSK@outbox-0.msg", &b"earlier message"[..]);
//!
//!     let client = FcpClient::new(node.clone());
//!
//!     // Slot 0 is taken, so the message lands in slot 1
//!     let outcome = client
//!         .slot_insert(&b"hello"[..], "KSK@outbox", 0, ".msg")
//!         .await?;
//!     assert_eq!(outcome, SlotInsertOutcome::Inserted { slot: 1 });
//!
//!     let data = client.fetch("KSK@outbox-1.msg").await?;
//!     assert_eq!(data.as_deref(), Some(&b"hello"[..]));
//!
//!     Ok(())
//! }
//! ```
//!
//! Plain threads can use [`blocking::BlockingClient`] instead.

pub mod blocking;
pub mod client;
pub mod config;
pub mod correlator;
pub mod error;
pub mod message;
pub mod outcome;
pub mod payload;
pub mod retry;
pub mod transport;

// Re-export main types
pub use client::{FcpClient, slot_name};
pub use config::ClientConfig;
pub use error::{ClientError, Result, SubmitError};
pub use message::{Request, Response, Verb};
pub use outcome::{
    FetchErrorCode, FetchFailure, InsertErrorCode, InsertFailure, InsertOutcome, KeyPair,
    SlotAbort, SlotInsertOutcome,
};
pub use payload::PayloadSource;
pub use retry::{BackoffPolicy, ShutdownSignal};
pub use transport::{Connection, MemoryConnection, ResponseListener};
