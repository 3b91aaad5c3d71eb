//! HTTP execution - URL assembly, validation and the reqwest send path

use std::time::{Duration, Instant};

use crate::constants::REQUEST_TIMEOUT_SECS;
use crate::error::{HttpError, ValidationError};
use crate::messages::{GatewayEvent, HttpOutcome};
use crate::models::{HttpMethod, KeyValue, SavedRequest, StatusBand};

/// Structural URL check applied after substitution, before any network use.
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or(ValidationError::MissingScheme)?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    if host.is_empty() {
        return Err(ValidationError::MissingHost);
    }
    Ok(())
}

/// Append query parameters to a URL, percent-encoding keys and values and
/// preserving their stored order. A URL that already carries a query string
/// is extended with '&'.
pub fn build_final_url(url: &str, params: &[KeyValue]) -> String {
    let mut out = String::from(url);
    let mut has_query = url.contains('?');
    for param in params {
        out.push(if has_query { '&' } else { '?' });
        has_query = true;
        out.push_str(&urlencoding::encode(&param.key));
        out.push('=');
        out.push_str(&urlencoding::encode(&param.value));
    }
    out
}

/// Create an HTTP client with default configuration
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Execute one request and package the result as a completion event.
/// Substitution and validation already happened in the app layer.
pub async fn send(client: &reqwest::Client, request: SavedRequest, token: u64) -> GatewayEvent {
    let start = Instant::now();
    let url = build_final_url(&request.url, &request.query_params);

    let mut builder = match request.method {
        HttpMethod::GET => client.get(&url),
        HttpMethod::POST => client.post(&url),
        HttpMethod::PUT => client.put(&url),
        HttpMethod::DELETE => client.delete(&url),
        HttpMethod::PATCH => client.patch(&url),
    };

    for header in &request.headers {
        if !header.key.trim().is_empty() {
            builder = builder.header(&header.key, &header.value);
        }
    }

    if request.method.has_body() && !request.body.is_empty() {
        builder = builder.body(request.body.clone());
    }

    let result = builder.send().await;
    let time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(resp) => {
            let status = resp.status();
            let status_code = status.as_u16();
            let status_text = status.canonical_reason().unwrap_or("").to_owned();
            match resp.text().await {
                Ok(body) => {
                    let size_bytes = body.len();
                    // Pretty-print JSON bodies; anything else passes through
                    let formatted =
                        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
                            serde_json::to_string_pretty(&json).unwrap_or(body)
                        } else {
                            body
                        };
                    GatewayEvent::HttpDone {
                        token,
                        time_ms,
                        result: Ok(HttpOutcome {
                            status_code,
                            status_text,
                            band: StatusBand::from_code(Some(status_code)),
                            body: formatted,
                            size_bytes,
                        }),
                    }
                }
                Err(e) => GatewayEvent::HttpDone {
                    token,
                    time_ms: start.elapsed().as_millis() as u64,
                    result: Err(HttpError::Other(format!("error reading body: {e}"))),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                HttpError::Timeout(REQUEST_TIMEOUT_SECS)
            } else if e.is_connect() {
                HttpError::Connect(e.to_string())
            } else {
                HttpError::Other(e.to_string())
            };
            GatewayEvent::HttpDone {
                token,
                time_ms,
                result: Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_accepts_both_schemes() {
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("https://example.com/path?q=1").is_ok());
        assert!(validate_url("  http://example.com  ").is_ok());
    }

    #[test]
    fn validation_rejects_empty_missing_scheme_and_missing_host() {
        assert_eq!(validate_url(""), Err(ValidationError::EmptyUrl));
        assert_eq!(validate_url("   "), Err(ValidationError::EmptyUrl));
        assert_eq!(validate_url("example.com"), Err(ValidationError::MissingScheme));
        assert_eq!(validate_url("ftp://example.com"), Err(ValidationError::MissingScheme));
        assert_eq!(validate_url("http://"), Err(ValidationError::MissingHost));
        assert_eq!(validate_url("https:///path"), Err(ValidationError::MissingHost));
    }

    #[test]
    fn params_are_appended_in_stored_order() {
        let params = vec![KeyValue::new("b", "2"), KeyValue::new("a", "1")];
        assert_eq!(
            build_final_url("http://x.test/p", &params),
            "http://x.test/p?b=2&a=1"
        );
    }

    #[test]
    fn params_extend_an_existing_query_string() {
        let params = vec![KeyValue::new("page", "2")];
        assert_eq!(
            build_final_url("http://x.test/p?q=hi", &params),
            "http://x.test/p?q=hi&page=2"
        );
    }

    #[test]
    fn params_are_percent_encoded() {
        let params = vec![KeyValue::new("q", "a b&c")];
        assert_eq!(
            build_final_url("http://x.test", &params),
            "http://x.test?q=a%20b%26c"
        );
    }

    #[test]
    fn no_params_leaves_url_untouched() {
        assert_eq!(build_final_url("http://x.test/p", &[]), "http://x.test/p");
    }
}
