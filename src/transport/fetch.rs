//! Outbound HTTP fetch primitive.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::dispatch::error::DispatchError;
use crate::dispatch::DispatchResult;

/// Parameters for an outbound fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchParams {
    pub url: String,
}

impl FetchParams {
    /// Structural validation, performed before the operation is admitted.
    pub fn validate(&self) -> Result<(), String> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("url must use http or https".to_string());
        }
        Ok(())
    }
}

/// Issue the fetch and report status plus body size.
///
/// The body itself is consumed, not forwarded; this operation exists to
/// exercise the non-blocking I/O path, not to proxy content.
pub async fn fetch(client: &reqwest::Client, params: &FetchParams) -> DispatchResult {
    let response = client
        .get(&params.url)
        .send()
        .await
        .map_err(|e| DispatchError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .map_err(|e| DispatchError::Transport(e.to_string()))?;

    Ok(json!({
        "url": params.url,
        "status": status,
        "bytes": body.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_schemes() {
        assert!(FetchParams {
            url: "ftp://example.com".into()
        }
        .validate()
        .is_err());
        assert!(FetchParams {
            url: "https://example.com".into()
        }
        .validate()
        .is_ok());
    }
}
