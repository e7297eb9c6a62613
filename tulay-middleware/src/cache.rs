//! Short-TTL cache of successful read responses.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use tulay_types::GatewayResponse;

/// Default validity window for cached responses.
const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct Entry {
    response: GatewayResponse,
    expires_at: Instant,
}

/// Cache of the last successful GET response per `system_code:endpoint`.
///
/// Expired entries are treated as misses and purged on read. Whole systems
/// can be invalidated after reconfiguration.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    /// Create a cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(system_code: &str, endpoint: &str) -> String {
        format!("{system_code}:{endpoint}")
    }

    /// Look up a live cached response.
    pub async fn get(&self, system_code: &str, endpoint: &str) -> Option<GatewayResponse> {
        let key = Self::key(system_code, endpoint);
        let mut guard = self.entries.lock().await;
        if let Some(entry) = guard.get(&key) {
            if Instant::now() <= entry.expires_at {
                return Some(entry.response.clone());
            }
            guard.remove(&key);
        }
        None
    }

    /// Store a response. Failure envelopes are never stored.
    pub async fn put(&self, system_code: &str, endpoint: &str, response: &GatewayResponse) {
        if !response.success {
            return;
        }
        let entry = Entry {
            response: response.clone(),
            expires_at: Instant::now() + self.ttl,
        };
        let mut guard = self.entries.lock().await;
        guard.insert(Self::key(system_code, endpoint), entry);
    }

    /// Drop every entry for `system_code`, or everything when `None`.
    pub async fn invalidate(&self, system_code: Option<&str>) {
        let mut guard = self.entries.lock().await;
        match system_code {
            Some(code) => {
                let prefix = format!("{code}:");
                guard.retain(|key, _| !key.starts_with(&prefix));
            }
            None => guard.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn ok_response(system: &str) -> GatewayResponse {
        GatewayResponse::from_http(system, 200, Map::new(), None, 5)
    }

    #[tokio::test]
    async fn failure_envelopes_are_not_stored() {
        let cache = ResponseCache::default();
        let nok = GatewayResponse::from_http("SSS", 503, Map::new(), None, 5);
        cache.put("SSS", "/members", &nok).await;
        assert!(cache.get("SSS", "/members").await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_read_as_misses() {
        let cache = ResponseCache::new(Duration::from_millis(40));
        cache.put("SSS", "/members", &ok_response("SSS")).await;
        assert!(cache.get("SSS", "/members").await.is_some());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get("SSS", "/members").await.is_none());
    }

    #[tokio::test]
    async fn invalidation_is_scoped_by_system() {
        let cache = ResponseCache::default();
        cache.put("SSS", "/a", &ok_response("SSS")).await;
        cache.put("SSS", "/b", &ok_response("SSS")).await;
        cache.put("BIR", "/a", &ok_response("BIR")).await;

        cache.invalidate(Some("SSS")).await;
        assert!(cache.get("SSS", "/a").await.is_none());
        assert!(cache.get("SSS", "/b").await.is_none());
        assert!(cache.get("BIR", "/a").await.is_some());

        cache.invalidate(None).await;
        assert!(cache.get("BIR", "/a").await.is_none());
    }
}
