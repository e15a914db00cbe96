//! Matching one asynchronous completion to one waiting caller
//!
//! Every submission gets its own one-shot channel. The sending half lives in
//! a [`PendingResponse`] handed to the connection as the request's listener;
//! the receiving half is awaited by the caller. Status messages are dropped
//! on the dispatch thread, so only a terminal message ever wakes the caller.
//! If the connection drops the listener or reports the link closed, the
//! sender goes away and the caller sees a closed connection.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::error::{ClientError, Result, SubmitError};
use crate::message::{Request, Response, Verb};
use crate::retry::ShutdownSignal;
use crate::transport::{Connection, ResponseListener};

struct PendingResponse {
    sender: Mutex<Option<oneshot::Sender<Response>>>,
}

impl ResponseListener for PendingResponse {
    fn on_response(&self, response: Response) {
        if !response.is_terminal() {
            trace!("Status update: {}", response.message_type());
            return;
        }

        match self.sender.lock().take() {
            Some(sender) => {
                // The caller only goes away together with the client
                let _ = sender.send(response);
            }
            None => warn!(
                "Dropping {} for an already completed request",
                response.message_type()
            ),
        }
    }

    fn on_closed(&self) {
        self.sender.lock().take();
    }
}

/// Issues requests one at a time and waits for their terminal response
pub struct Correlator {
    connection: Arc<dyn Connection>,
    in_flight: tokio::sync::Mutex<()>,
    shutdown: ShutdownSignal,
    retries: AtomicU64,
}

impl Correlator {
    pub fn new(connection: Arc<dyn Connection>, shutdown: ShutdownSignal) -> Self {
        Self {
            connection,
            in_flight: tokio::sync::Mutex::new(()),
            shutdown,
            retries: AtomicU64::new(0),
        }
    }

    pub fn new_request(&self, verb: Verb) -> Request {
        self.connection.new_request(verb)
    }

    /// Submit `request` and wait for its terminal response.
    ///
    /// While the node is unreachable the request is resubmitted every
    /// `backoff` for as long as it takes. A permanently closed link ends the
    /// call with [`ClientError::ConnectionClosed`].
    pub async fn issue(&self, request: Request, backoff: Duration) -> Result<Response> {
        let _in_flight = self.in_flight.lock().await;
        let verb = request.verb();

        loop {
            let (sender, receiver) = oneshot::channel();
            let listener = Arc::new(PendingResponse {
                sender: Mutex::new(Some(sender)),
            });

            match self.connection.submit(listener, request.clone()) {
                Ok(()) => {
                    debug!("Submitted {verb}, waiting for completion");
                    return receiver.await.map_err(|_| ClientError::ConnectionClosed);
                }
                Err(SubmitError::NoNode(reason)) => {
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    warn!("No node available for {verb} ({reason}), retrying in {backoff:?}");
                    self.shutdown.sleep(backoff).await?;
                }
                Err(SubmitError::Terminated) => {
                    debug!("Connection terminated while submitting {verb}");
                    return Err(ClientError::ConnectionClosed);
                }
            }
        }
    }

    /// Number of resubmissions caused by an unreachable node
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}
