//! Retry wrapper used for every backend call.
//!
//! An attempt fails on a transport error or a non-2xx status. After a failed
//! attempt that is not the last, the requester sleeps
//! `base * 2^attempt + random(0, base)` and tries again. Payload-level problems
//! (empty fields, undecodable bodies) are never retried; they are raised by the
//! typed helpers after a successful response.

use moonlit_core::{BackendError, RetryPolicy};
use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::transport::{HttpTransport, ReqwestTransport};

/// Exponential-backoff requester over an [`HttpTransport`].
///
/// Stateless between calls: concurrent calls are independent and are not
/// deduplicated.
#[derive(Debug, Clone)]
pub struct ResilientRequester<T = ReqwestTransport> {
    transport: T,
}

impl<T: HttpTransport> ResilientRequester<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Access the underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// POST `payload` to `endpoint`, retrying per `policy`, and return the body.
    pub async fn call(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
        policy: &RetryPolicy,
    ) -> Result<String, BackendError> {
        let mut attempt: u32 = 0;

        loop {
            let failure = match self.transport.post_json(endpoint, payload).await {
                Ok(response) if response.is_success() => {
                    if attempt > 0 {
                        tracing::debug!(
                            endpoint,
                            attempt = attempt + 1,
                            "Request succeeded after retry"
                        );
                    }
                    return Ok(response.body);
                }
                Ok(response) => BackendError::Http {
                    endpoint: endpoint.to_string(),
                    status: response.status,
                    body: response.body,
                },
                Err(err) => BackendError::Network {
                    endpoint: endpoint.to_string(),
                    source: Box::new(err),
                },
            };

            if policy.is_final(attempt) {
                tracing::error!(
                    endpoint,
                    attempts = attempt + 1,
                    error = %failure,
                    "Request failed"
                );
                return Err(failure);
            }

            let jitter = rand::thread_rng().gen_range(0..policy.base_delay_ms().max(1));
            let delay = policy.delay_for(attempt, jitter);
            tracing::warn!(
                endpoint,
                attempt = attempt + 1,
                max_attempts = policy.max_attempts(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %failure,
                "Request attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Serialize `body`, [`call`](Self::call), and deserialize the response.
    pub async fn post_json<B, R>(
        &self,
        endpoint: &str,
        body: &B,
        policy: &RetryPolicy,
    ) -> Result<R, BackendError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_value(body).map_err(|e| BackendError::Decode {
            what: "request payload",
            reason: e.to_string(),
        })?;
        let text = self.call(endpoint, &payload, policy).await?;
        serde_json::from_str(&text).map_err(|e| BackendError::Decode {
            what: "response body",
            reason: e.to_string(),
        })
    }
}
