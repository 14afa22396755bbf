//! Webhook calls over `reqwest`.

use autoflow_app::ports::{HttpRequest, HttpResponse, TransportError};
use autoflow_domain::automation::HttpMethod;
use reqwest::Method;

use crate::config::HttpConfig;
use crate::error::BuildError;

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Empty bodies become `null`; anything that is not JSON is kept as text.
fn parse_body(text: String) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
}

#[derive(Debug, Clone)]
pub(crate) struct WebhookClient {
    client: reqwest::Client,
}

impl WebhookClient {
    pub(crate) fn new(config: HttpConfig) -> Result<Self, BuildError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("autoflow/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub(crate) async fn call(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_method(request.method), &request.url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        tracing::debug!(url = %request.url, method = request.method.as_str(), status, "webhook answered");
        Ok(HttpResponse {
            status,
            body: parse_body(text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_parse_json_bodies() {
        assert_eq!(parse_body(r#"{"ok":true}"#.to_string()), json!({"ok": true}));
    }

    #[test]
    fn should_keep_plain_text_bodies_as_strings() {
        assert_eq!(parse_body("accepted".to_string()), json!("accepted"));
    }

    #[test]
    fn should_map_empty_body_to_null() {
        assert_eq!(parse_body("  ".to_string()), serde_json::Value::Null);
    }
}
