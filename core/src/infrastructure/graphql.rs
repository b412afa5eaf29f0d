//! reqwest-backed GraphQL client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::FeedClient;
use crate::error::{ConfigError, FeedError};

/// Longest response body quoted in an error.
const ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

/// Posts `{query, variables}` to a single GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpFeedClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(HttpFeedClient {
            http,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn query(&self, document: &str, variables: Value) -> Result<Value, FeedError> {
        let body = json!({ "query": document, "variables": variables });
        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FeedError::Timeout(self.timeout)
                } else {
                    FeedError::from(e)
                }
            })?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        parse_response(status, &text)
    }
}

/// Turn a raw HTTP answer into the GraphQL `data` object.
pub fn parse_response(status: u16, body: &str) -> Result<Value, FeedError> {
    if !(200..300).contains(&status) {
        return Err(FeedError::Http {
            status,
            body: body.chars().take(ERROR_BODY_CHARS).collect(),
        });
    }
    let envelope: Envelope = serde_json::from_str(body)?;
    if !envelope.errors.is_empty() {
        let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
        return Err(FeedError::GraphQl(messages.join("; ")));
    }
    envelope
        .data
        .ok_or_else(|| FeedError::Schema("response has no data".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_data_object() {
        let data = parse_response(200, r#"{"data":{"minters":{"items":[]}}}"#).unwrap();
        assert_eq!(data["minters"]["items"], json!([]));
    }

    #[test]
    fn graphql_errors_are_failures() {
        let err = parse_response(
            200,
            r#"{"data":null,"errors":[{"message":"bad field"},{"message":"again"}]}"#,
        )
        .unwrap_err();
        match err {
            FeedError::GraphQl(msg) => assert_eq!(msg, "bad field; again"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn http_status_is_reported() {
        let err = parse_response(502, "bad gateway").unwrap_err();
        assert!(matches!(err, FeedError::Http { status: 502, .. }));
    }

    #[test]
    fn non_json_body_is_schema_error() {
        assert!(matches!(parse_response(200, "<html>"), Err(FeedError::Schema(_))));
    }

    #[test]
    fn missing_data_is_schema_error() {
        assert!(matches!(parse_response(200, "{}"), Err(FeedError::Schema(_))));
    }

    #[test]
    fn long_error_bodies_are_clipped() {
        let body = "x".repeat(10_000);
        match parse_response(500, &body).unwrap_err() {
            FeedError::Http { body, .. } => assert_eq!(body.len(), ERROR_BODY_CHARS),
            other => panic!("unexpected {:?}", other),
        }
    }
}
