//! Outbound header assembly and URL joining.

use std::collections::HashMap;

use chrono::Utc;

use tulay_types::{AuthScheme, GatewayRequest, SystemConfig};

use crate::profile::SystemProfile;

/// Header carrying the API key under the `ApiKey` auth scheme.
const API_KEY_HEADER: &str = "X-API-Key";

/// Assemble the complete header set for one outbound call.
///
/// Layering, earliest first: content defaults, the partner's auth and
/// identification headers, correlation metadata, then caller-supplied
/// headers, which win on conflict.
#[must_use]
pub fn build_headers(
    config: &SystemConfig,
    request: &GatewayRequest,
    profile: &SystemProfile,
) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    if let Some(accept) = profile.accept {
        headers.insert("Accept".to_string(), accept.to_string());
    }

    match config.auth_scheme {
        AuthScheme::Bearer => {
            if let Some(key) = &config.api_key {
                headers.insert("Authorization".to_string(), format!("Bearer {key}"));
            }
        }
        AuthScheme::ApiKey => {
            if let Some(key) = &config.api_key {
                headers.insert(API_KEY_HEADER.to_string(), key.clone());
            }
        }
        AuthScheme::None => {}
        _ => {}
    }

    if let Some(name) = profile.client_id_header
        && let Some(id) = &config.client_id
    {
        headers.insert(name.to_string(), id.clone());
    }
    if let Some(name) = profile.client_secret_header
        && let Some(secret) = &config.client_secret
    {
        headers.insert(name.to_string(), secret.clone());
    }
    for (name, value) in profile.extra_headers {
        headers.insert((*name).to_string(), (*value).to_string());
    }

    if let Some(id) = &request.request_id {
        headers.insert("X-Request-ID".to_string(), id.clone());
    }
    if let Some(id) = &request.correlation_id {
        headers.insert("X-Correlation-ID".to_string(), id.clone());
    }
    if let Some(id) = &request.user_id {
        headers.insert("X-User-ID".to_string(), id.clone());
    }
    headers.insert("X-Timestamp".to_string(), Utc::now().to_rfc3339());

    for (name, value) in &request.headers {
        headers.insert(name.clone(), value.clone());
    }

    headers
}

/// Join base URL, partner path prefix, and endpoint with exactly one `/` at
/// each seam.
#[must_use]
pub fn join_url(base_url: &str, path_prefix: &str, endpoint: &str) -> String {
    let mut url = base_url.trim_end_matches('/').to_string();
    for segment in [path_prefix, endpoint] {
        if segment.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(segment.trim_start_matches('/').trim_end_matches('/'));
    }
    url
}
