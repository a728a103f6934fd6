//! Bounded response body reading shared by the HTTP integrations.

use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::errors::MarketDataError;

/// Largest response body an integration will read.
pub(crate) const MAX_BODY_BYTES: usize = 1024 * 1024;

/// How much of an undecodable body is echoed into the error message.
const BODY_EXCERPT_BYTES: usize = 512;

/// Append the response body to `buf`, failing once it passes `limit` bytes.
pub(crate) async fn read_body(
    provider: &str,
    response: &mut Response,
    buf: &mut Vec<u8>,
    limit: usize,
) -> Result<(), MarketDataError> {
    let too_large = || {
        MarketDataError::provider(provider, format!("response body exceeds {} bytes", limit))
    };

    if response
        .content_length()
        .is_some_and(|len| len > limit as u64)
    {
        return Err(too_large());
    }

    while let Some(chunk) = response.chunk().await? {
        if buf.len() + chunk.len() > limit {
            return Err(too_large());
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(())
}

/// Decode a JSON body, reporting failures as provider errors.
pub(crate) fn decode_json<T: DeserializeOwned>(
    provider: &str,
    body: &[u8],
) -> Result<T, MarketDataError> {
    serde_json::from_slice(body).map_err(|e| {
        let excerpt = &body[..body.len().min(BODY_EXCERPT_BYTES)];
        MarketDataError::provider(
            provider,
            format!(
                "failed to decode json: {}. body: {}",
                e,
                String::from_utf8_lossy(excerpt)
            ),
        )
    })
}
