//! Fetch by name with redirect following

use bytes::Bytes;
use tracing::debug;

use super::FcpClient;
use crate::error::{ClientError, Result};
use crate::message::{Response, Verb, headers, types};
use crate::outcome::{FetchErrorCode, FetchFailure};

enum FetchStep {
    Data(Bytes),
    Redirect(String),
    Missing,
}

impl FcpClient {
    /// Fetch the content stored under `name`.
    ///
    /// Redirects are followed up to the configured hop limit. `Ok(None)`
    /// means the node redirected without naming a target, failed without a
    /// cause code, or completed without attaching any data.
    pub async fn fetch(&self, name: &str) -> Result<Option<Bytes>> {
        let mut target = name.to_string();
        let mut hops = 0;

        loop {
            let mut request = self.correlator.new_request(Verb::ClientGet);
            request
                .set_header(headers::URI, target.as_str())
                .set_header(headers::RETURN_TYPE, headers::RETURN_DIRECT)
                .set_header(headers::PERSISTENCE, headers::PERSIST_CONNECTION);

            let response = self
                .correlator
                .issue(request, self.config.backoff.fetch_delay)
                .await?;

            match interpret(&target, response)? {
                FetchStep::Data(data) => return Ok(Some(data)),
                FetchStep::Missing => return Ok(None),
                FetchStep::Redirect(next) => {
                    if hops >= self.config.max_redirects {
                        return Err(ClientError::TooManyRedirects {
                            name: name.to_string(),
                            hops,
                        });
                    }
                    hops += 1;
                    debug!("{target} redirected to {next} (hop {hops})");
                    target = next;
                }
            }
        }
    }
}

fn interpret(name: &str, response: Response) -> Result<FetchStep> {
    if response.is_type(types::ALL_DATA) {
        return Ok(response
            .into_data()
            .map_or(FetchStep::Missing, FetchStep::Data));
    }

    if response.is_type(types::GET_FAILED) {
        let code = match response.code() {
            None => return Ok(FetchStep::Missing),
            Some(Ok(code)) => FetchErrorCode::from_code(code),
            Some(Err(_)) => return Err(fetch_failed(name, response)),
        };
        if code.is_redirect() {
            return Ok(response
                .header(headers::REDIRECT_URI)
                .map_or(FetchStep::Missing, |uri| FetchStep::Redirect(uri.to_string())));
        }
    }

    Err(fetch_failed(name, response))
}

fn fetch_failed(name: &str, response: Response) -> ClientError {
    ClientError::FetchFailed(Box::new(FetchFailure::new(name, response)))
}
