//! Insert by name

use tracing::debug;

use super::FcpClient;
use crate::error::Result;
use crate::message::{Verb, headers, types};
use crate::outcome::{InsertFailure, InsertOutcome};
use crate::payload::PayloadSource;

impl FcpClient {
    /// Store `payload` under `name`.
    ///
    /// A payload that cannot be read fails with
    /// [`ClientError::BadInput`](crate::ClientError::BadInput) before anything
    /// is sent to the node. Node-side rejections come back as
    /// [`InsertOutcome::Failed`].
    pub async fn insert(
        &self,
        payload: impl Into<PayloadSource>,
        name: &str,
    ) -> Result<InsertOutcome> {
        self.insert_source(&payload.into(), name).await
    }

    pub(super) async fn insert_source(
        &self,
        payload: &PayloadSource,
        name: &str,
    ) -> Result<InsertOutcome> {
        let data = payload.load().await?;

        let mut request = self.correlator.new_request(Verb::ClientPut);
        request
            .set_header(headers::URI, name)
            .set_header(headers::PERSISTENCE, headers::PERSIST_CONNECTION)
            .set_data(data);

        let response = self
            .correlator
            .issue(request, self.config.backoff.request_delay)
            .await?;

        if response.is_type(types::PUT_SUCCESSFUL) {
            debug!("Inserted {name}");
            Ok(InsertOutcome::Success)
        } else {
            let failure = InsertFailure::from_response(&response);
            debug!("Insert of {name} failed: {failure}");
            Ok(InsertOutcome::Failed(failure))
        }
    }
}
