use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::ChatConfig;
use crate::error::ChatError;

/// Used when a failed response carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to get response from AI";
const MALFORMED_BODY: &str = "malformed response body";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Body of a chat completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

/// Anything that can turn a request into the first choice's text.
#[async_trait]
pub trait CompletionEndpoint: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ChatError>;
}

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct LlmClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    referer: String,
    title: String,
}

impl LlmClient {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }
}

#[async_trait]
impl CompletionEndpoint for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ChatError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ChatError::Network(format!("failed to read response: {e}")))?;

        debug!(status, body_len = body.len(), "Completion response received");
        parse_completion(status, &body)
    }
}

/// Map a raw HTTP status and body onto the first choice's content or a
/// typed failure.
pub fn parse_completion(status: u16, body: &str) -> Result<String, ChatError> {
    let json: Option<Value> = serde_json::from_str(body).ok();
    let error_message = json.as_ref().and_then(error_message);

    if !(200..300).contains(&status) {
        return Err(ChatError::Upstream {
            status: Some(status),
            message: error_message.unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string()),
        });
    }

    let malformed = || ChatError::Upstream {
        status: Some(status),
        message: MALFORMED_BODY.to_string(),
    };
    let Some(Value::Object(fields)) = json else {
        return Err(malformed());
    };

    if let Some(message) = error_message {
        return Err(ChatError::Upstream {
            status: Some(status),
            message,
        });
    }

    let choices = match fields.get("choices") {
        None | Some(Value::Null) => return Err(ChatError::EmptyResponse),
        Some(Value::Array(choices)) => choices,
        Some(_) => return Err(malformed()),
    };
    let Some(first) = choices.first() else {
        return Err(ChatError::EmptyResponse);
    };
    let Some(message) = first.get("message").and_then(Value::as_object) else {
        return Err(malformed());
    };

    // a missing, null or blank content counts as no answer
    match message.get("content") {
        Some(Value::String(content)) if !content.trim().is_empty() => Ok(content.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => Err(ChatError::EmptyResponse),
        Some(_) => Err(malformed()),
    }
}

fn error_message(json: &Value) -> Option<String> {
    match json.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        err => Some(
            err.get("message")
                .and_then(|m| m.as_str())
                .unwrap_or(FALLBACK_ERROR_MESSAGE)
                .to_string(),
        ),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"Hola"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(parse_completion(200, body).unwrap(), "Hola");
    }

    #[test]
    fn test_parse_empty_choices() {
        assert_eq!(
            parse_completion(200, r#"{"choices":[]}"#),
            Err(ChatError::EmptyResponse)
        );
        assert_eq!(
            parse_completion(200, r#"{"id":"x"}"#),
            Err(ChatError::EmptyResponse)
        );
    }

    #[test]
    fn test_parse_null_content_is_empty_response() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        assert_eq!(parse_completion(200, body), Err(ChatError::EmptyResponse));
    }

    #[test]
    fn test_parse_non_2xx_uses_error_message() {
        let body = r#"{"error":{"message":"rate limited","code":429}}"#;
        assert_eq!(
            parse_completion(500, body),
            Err(ChatError::Upstream {
                status: Some(500),
                message: "rate limited".to_string()
            })
        );
    }

    #[test]
    fn test_parse_non_2xx_without_body_uses_fallback() {
        assert_eq!(
            parse_completion(502, "<html>Bad Gateway</html>"),
            Err(ChatError::Upstream {
                status: Some(502),
                message: FALLBACK_ERROR_MESSAGE.to_string()
            })
        );
    }

    #[test]
    fn test_parse_error_body_with_success_status() {
        let body = r#"{"error":{"message":"model not found"}}"#;
        assert!(matches!(
            parse_completion(200, body),
            Err(ChatError::Upstream { message, .. }) if message == "model not found"
        ));
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            parse_completion(200, "not json"),
            Err(ChatError::Upstream { message, .. }) if message == "malformed response body"
        ));
    }

    #[test]
    fn test_parse_ill_shaped_success_bodies_are_upstream_errors() {
        let bodies = [
            "null",
            "[]",
            "42",
            r#""text""#,
            r#"{"choices":"oops"}"#,
            r#"{"choices":[{"message":"x"}]}"#,
            r#"{"choices":["x"]}"#,
            r#"{"choices":[{"message":{"content":7}}]}"#,
        ];
        for body in bodies {
            assert_eq!(
                parse_completion(200, body),
                Err(ChatError::Upstream {
                    status: Some(200),
                    message: MALFORMED_BODY.to_string()
                }),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn test_parse_missing_or_blank_content_is_empty_response() {
        for body in [
            r#"{"choices":null}"#,
            r#"{"choices":[{"message":{}}]}"#,
            r#"{"choices":[{"message":{"content":"  \n"}}]}"#,
        ] {
            assert_eq!(parse_completion(200, body), Err(ChatError::EmptyResponse), "body: {}", body);
        }
    }

    #[test]
    fn test_request_serializes_lowercase_roles() {
        let request = CompletionRequest {
            model: "m".to_string(),
            messages: vec![Message {
                role: Role::Assistant,
                content: "hi".to_string(),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "assistant");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["model"], "m");
    }
}
