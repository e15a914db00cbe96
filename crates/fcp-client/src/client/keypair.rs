//! Key-pair generation

use tracing::warn;

use super::FcpClient;
use crate::error::Result;
use crate::message::{Response, Verb, headers, types};
use crate::outcome::KeyPair;

impl FcpClient {
    /// Ask the node for a fresh signed-subspace key pair.
    ///
    /// Returns `Ok(None)` when the node answers with anything other than a
    /// key pair; callers must check for it.
    pub async fn generate_key_pair(&self) -> Result<Option<KeyPair>> {
        let request = self.correlator.new_request(Verb::GenerateSsk);
        let response = self
            .correlator
            .issue(request, self.config.backoff.request_delay)
            .await?;
        Ok(key_pair_from(&response))
    }
}

fn key_pair_from(response: &Response) -> Option<KeyPair> {
    if !response.is_type(types::SSK_KEYPAIR) {
        warn!("Key generation answered with {}", response.message_type());
        return None;
    }

    let public_key = response.header(headers::REQUEST_URI)?;
    let private_key = response.header(headers::INSERT_URI)?;
    Some(KeyPair::new(public_key, private_key))
}
