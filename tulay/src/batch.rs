//! Concurrent fan-out of independent requests.

use std::collections::HashMap;

use tulay_types::{ErrorCode, GatewayRequest, GatewayResponse};

use crate::core::Gateway;

impl Gateway {
    /// Dispatch every entry concurrently through the resilience layer and
    /// collect one envelope per key.
    ///
    /// This is a join, not a race: the map returns only once every entry has
    /// reached a terminal state. One entry's exhaustion or fault is captured
    /// under its own key and never aborts or delays its siblings, so total
    /// wall-clock tracks the slowest entry rather than the sum. Keys are
    /// opaque caller labels; each request dispatches to its own
    /// `system_code`.
    pub async fn dispatch_batch(
        &self,
        requests: HashMap<String, GatewayRequest>,
    ) -> HashMap<String, GatewayResponse> {
        tracing::info!(entries = requests.len(), "dispatching batch");

        let tasks = requests.into_iter().map(|(key, request)| async move {
            let response = match self.dispatch_with_retry(&request.system_code, &request).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::error!(key = %key, error = %err, "batch entry rejected");
                    GatewayResponse::failure(
                        request.system_code.clone(),
                        ErrorCode::InternalError,
                        err.to_string(),
                    )
                }
            };
            (key, response)
        });

        futures::future::join_all(tasks).await.into_iter().collect()
    }
}
