//! Connection seam between the high-level client and the node link
//!
//! A [`Connection`] owns the physical link and all wire-level multiplexing.
//! The client hands it one request at a time together with a
//! [`ResponseListener`]; the connection routes every response correlated to
//! that request back to the listener, typically from its own dispatch thread.
//!
//! One connection is shared by any number of clients:
//!
//! ```text
//! ┌──────────┐ ┌──────────┐ ┌──────────┐
//! │ FcpClient│ │ FcpClient│ │ FcpClient│
//! └────┬─────┘ └────┬─────┘ └────┬─────┘
//!      │ submit     │            │
//! ┌────▼────────────▼────────────▼─────┐
//! │ Connection (dispatch thread)       │
//! └────────────────────────────────────┘
//! ```

mod memory;

pub use memory::MemoryConnection;

use std::sync::Arc;

use crate::error::SubmitError;
use crate::message::{Request, Response, Verb};

/// Receives the responses correlated to one submitted request
pub trait ResponseListener: Send + Sync {
    /// Called once per response, status updates included
    fn on_response(&self, response: Response);

    /// Called if the link closes permanently while the request is pending
    fn on_closed(&self) {}
}

/// Shared link to a node
pub trait Connection: Send + Sync {
    /// Allocate an outgoing message for `verb`
    fn new_request(&self, verb: Verb) -> Request {
        Request::new(verb)
    }

    /// Dispatch `request`, registering `listener` for its responses.
    ///
    /// Fails with [`SubmitError::NoNode`] when no live link exists and with
    /// [`SubmitError::Terminated`] once the link is permanently closed.
    fn submit(
        &self,
        listener: Arc<dyn ResponseListener>,
        request: Request,
    ) -> Result<(), SubmitError>;
}
