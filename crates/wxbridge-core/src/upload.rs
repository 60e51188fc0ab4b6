//! Upload client for the Weather Underground PWS protocol.
//!
//! The protocol is a GET request carrying the record as query parameters;
//! the server answers 200 with `success` in the body when the observation
//! is accepted. Anything else is a typed [`UploadError`] the caller logs
//! and moves past — the bridge never retries, the next reading is seconds
//! away.

use std::time::Duration;

use thiserror::Error;

use crate::translate::OutboundRecord;

/// Weather Underground PWS upload endpoint.
///
/// See <https://support.weather.com/s/article/PWS-Upload-Protocol>.
pub const UPLOAD_URL: &str =
    "https://weatherstation.wunderground.com/weatherstation/updateweatherstation.php";

/// Bound on a single upload request, so a stalled network call cannot hold
/// the read loop for longer than this.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Upload failures. All are non-fatal to the read loop.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Network-level failure (DNS, connect, timeout).
    #[error("upload transport failure: {0}")]
    Transport(String),

    /// Server answered with a non-success HTTP status.
    #[error("upload rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Server answered 200 but without the success marker in the body.
    #[error("upload not acknowledged: {0}")]
    NotAcknowledged(String),
}

/// Blocking upload client with a bounded per-request timeout.
pub struct Uploader {
    agent: ureq::Agent,
    url: String,
}

impl Default for Uploader {
    fn default() -> Self {
        Self::new()
    }
}

impl Uploader {
    /// Client for the fixed Weather Underground endpoint.
    pub fn new() -> Self {
        Self::with_url(UPLOAD_URL)
    }

    /// Client for an alternate endpoint. Tests point this at a local
    /// listener.
    pub fn with_url(url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(UPLOAD_TIMEOUT)
            .user_agent(&format!("wxbridge/{}", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            url: url.to_string(),
        }
    }

    /// Endpoint this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one outbound record as query parameters.
    pub fn upload(&self, record: &OutboundRecord) -> Result<(), UploadError> {
        let mut request = self.agent.get(&self.url);
        for (name, value) in record.query_pairs() {
            request = request.query(&name, &value);
        }

        match request.call() {
            Ok(response) => {
                let body = response
                    .into_string()
                    .map_err(|e| UploadError::Transport(e.to_string()))?;
                if body.contains("success") {
                    Ok(())
                } else {
                    Err(UploadError::NotAcknowledged(body.trim().to_string()))
                }
            }
            Err(ureq::Error::Status(status, response)) => Err(UploadError::Status {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(UploadError::Transport(e.to_string())),
        }
    }
}
