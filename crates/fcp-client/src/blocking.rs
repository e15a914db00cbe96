//! Blocking wrapper for callers on plain OS threads
//!
//! Each [`BlockingClient`] owns a single-threaded runtime and parks the
//! calling thread until the operation completes. It must not be used from
//! inside an async context.

use bytes::Bytes;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

use crate::client::FcpClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::outcome::{InsertOutcome, KeyPair, SlotInsertOutcome};
use crate::payload::PayloadSource;
use crate::retry::ShutdownSignal;
use crate::transport::Connection;

pub struct BlockingClient {
    inner: FcpClient,
    runtime: Runtime,
}

impl BlockingClient {
    pub fn new(connection: Arc<dyn Connection>) -> Result<Self> {
        Self::with_config(connection, ClientConfig::default())
    }

    pub fn with_config(connection: Arc<dyn Connection>, config: ClientConfig) -> Result<Self> {
        Self::with_shutdown(connection, config, ShutdownSignal::new())
    }

    pub fn with_shutdown(
        connection: Arc<dyn Connection>,
        config: ClientConfig,
        shutdown: ShutdownSignal,
    ) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_time().build()?;
        Ok(Self {
            inner: FcpClient::with_shutdown(connection, config, shutdown),
            runtime,
        })
    }

    pub fn fetch(&self, name: &str) -> Result<Option<Bytes>> {
        self.runtime.block_on(self.inner.fetch(name))
    }

    pub fn generate_key_pair(&self) -> Result<Option<KeyPair>> {
        self.runtime.block_on(self.inner.generate_key_pair())
    }

    pub fn insert(&self, payload: impl Into<PayloadSource>, name: &str) -> Result<InsertOutcome> {
        self.runtime.block_on(self.inner.insert(payload, name))
    }

    pub fn slot_insert(
        &self,
        payload: impl Into<PayloadSource>,
        base_name: &str,
        start_slot: u32,
        suffix: &str,
    ) -> Result<SlotInsertOutcome> {
        self.runtime
            .block_on(self.inner.slot_insert(payload, base_name, start_slot, suffix))
    }

    pub fn submit_retries(&self) -> u64 {
        self.inner.submit_retries()
    }
}
