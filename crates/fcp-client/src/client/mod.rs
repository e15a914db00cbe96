//! # High-level FCP client
//!
//! [`FcpClient`] turns the node's asynchronous, multiplexed protocol into
//! plain call/return operations:
//!
//! - [`FcpClient::fetch`] retrieves content by name, following redirects
//! - [`FcpClient::generate_key_pair`] asks the node for a fresh key pair
//! - [`FcpClient::insert`] stores content under a name
//! - [`FcpClient::slot_insert`] stores content under the first free
//!   `{base}-{slot}{suffix}` name, racing other inserters without locks
//!
//! Each client issues at most one request at a time; create one client per
//! concurrent caller and share the [`Connection`] between them.
//!
//! ```text
//! caller ──► FcpClient ──► Correlator ──submit──► Connection
//!   ▲                          │                      │
//!   └──── terminal response ◄──┴──── dispatch thread ◄┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust,no_run
//! use fcp_client::{ClientError, FcpClient};
//!
//! async fn read_mailbox(client: &FcpClient) {
//!     match client.fetch("KSK@mailbox").await {
//!         Ok(Some(data)) => println!("{} bytes", data.len()),
//!         Ok(None) => println!("redirect without a target"),
//!         Err(ClientError::FetchFailed(failure)) => eprintln!("{failure}"),
//!         Err(e) if e.is_fatal() => eprintln!("node link is gone: {e}"),
//!         Err(e) => eprintln!("fetch failed: {e}"),
//!     }
//! }
//! ```

mod fetch;
mod insert;
mod keypair;
mod slot;

pub use slot::slot_name;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::correlator::Correlator;
use crate::retry::ShutdownSignal;
use crate::transport::Connection;

/// Call/return client over a shared node connection
pub struct FcpClient {
    correlator: Correlator,
    config: ClientConfig,
}

impl FcpClient {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self::with_config(connection, ClientConfig::default())
    }

    pub fn with_config(connection: Arc<dyn Connection>, config: ClientConfig) -> Self {
        Self::with_shutdown(connection, config, ShutdownSignal::new())
    }

    /// Create a client whose backoff waits end when `shutdown` is triggered
    pub fn with_shutdown(
        connection: Arc<dyn Connection>,
        config: ClientConfig,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            correlator: Correlator::new(connection, shutdown),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resubmissions this client made because no node was reachable
    pub fn submit_retries(&self) -> u64 {
        self.correlator.retries()
    }
}
