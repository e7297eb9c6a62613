//! Scripted HTTP transport double.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use tulay_core::{HttpTransport, OutboundRequest, RawResponse, TransportError};

/// Instruction for how one executed call should behave.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Answer with this status and body.
    Respond {
        /// HTTP status to return.
        status: u16,
        /// Body to return.
        body: Option<Value>,
    },
    /// Fail with the given transport error.
    Fail(TransportError),
    /// Never complete (simulate a stalled partner; pair with a timeout).
    Hang,
    /// Sleep, then answer with this status and an empty body.
    Delay(Duration, u16),
}

impl MockBehavior {
    /// Shorthand for a 200 response with the given body.
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::Respond {
            status: 200,
            body: Some(body),
        }
    }

    /// Shorthand for a bodiless response with the given status.
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self::Respond { status, body: None }
    }
}

/// [`HttpTransport`] double that records every outbound request and answers
/// from, in precedence order: a consumable script queue, URL-fragment rules,
/// then a default behavior (200, empty JSON object).
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<MockBehavior>>,
    rules: Mutex<Vec<(String, MockBehavior)>>,
    default: Mutex<Option<MockBehavior>>,
    calls: Mutex<Vec<OutboundRequest>>,
}

impl MockTransport {
    /// Transport answering 200 with an empty object to everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport answering every call with `behavior`.
    #[must_use]
    pub fn always(behavior: MockBehavior) -> Self {
        Self {
            default: Mutex::new(Some(behavior)),
            ..Self::default()
        }
    }

    /// Replace the fallback behavior.
    pub async fn set_default(&self, behavior: MockBehavior) {
        *self.default.lock().await = Some(behavior);
    }

    /// Queue a one-shot behavior; the script drains before rules apply.
    pub async fn push(&self, behavior: MockBehavior) {
        self.script.lock().await.push_back(behavior);
    }

    /// Answer calls whose URL contains `url_part` with `behavior`.
    pub async fn add_rule(&self, url_part: impl Into<String>, behavior: MockBehavior) {
        self.rules.lock().await.push((url_part.into(), behavior));
    }

    /// Every request executed so far, in order.
    pub async fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.lock().await.clone()
    }

    /// Number of requests executed so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn behavior_for(&self, url: &str) -> MockBehavior {
        if let Some(next) = self.script.lock().await.pop_front() {
            return next;
        }
        for (fragment, behavior) in self.rules.lock().await.iter() {
            if url.contains(fragment.as_str()) {
                return behavior.clone();
            }
        }
        self.default
            .lock()
            .await
            .clone()
            .unwrap_or_else(|| MockBehavior::ok(Value::Object(serde_json::Map::new())))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        let url = request.url.clone();
        self.calls.lock().await.push(request);

        match self.behavior_for(&url).await {
            MockBehavior::Respond { status, body } => Ok(RawResponse {
                status,
                headers: HashMap::new(),
                body,
            }),
            MockBehavior::Fail(err) => Err(err),
            MockBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending future resolved")
            }
            MockBehavior::Delay(duration, status) => {
                tokio::time::sleep(duration).await;
                Ok(RawResponse {
                    status,
                    headers: HashMap::new(),
                    body: None,
                })
            }
        }
    }
}
