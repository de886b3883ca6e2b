use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::ModelConfig;
use crate::errors::SynthesisError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant that provides accurate, well-cited answers based on search results. Use clear citations and maintain a neutral, informative tone.";

/// Hosted language model turning a prompt into a single answer string.
#[async_trait]
pub trait AnswerModel: Send + Sync {
    async fn synthesize(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SynthesisError>;
}

#[derive(Debug, Clone, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    // tool_use, thinking and whatever comes next
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    config: ModelConfig,
}

impl AnthropicClient {
    pub fn new(client: reqwest::Client, config: ModelConfig) -> Self {
        Self { client, config }
    }

    async fn complete(&self, prompt: &str) -> Result<String, SynthesisError> {
        let request = ApiRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.config.url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                log::debug!("failed to read language model error body: {e}");
                String::new()
            });
            return Err(SynthesisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        collect_answer(&body)
    }
}

#[async_trait]
impl AnswerModel for AnthropicClient {
    async fn synthesize(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SynthesisError> {
        log::trace!("prompt:\n{prompt}");
        tokio::select! {
            _ = cancel.cancelled() => Err(SynthesisError::Cancelled),
            answer = self.complete(prompt) => answer,
        }
    }
}

/// Concatenates the text blocks of a Messages API body, skipping other block types.
fn collect_answer(body: &str) -> Result<String, SynthesisError> {
    let api_response: ApiResponse =
        serde_json::from_str(body).map_err(|e| SynthesisError::Malformed(e.to_string()))?;

    let answer = api_response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect::<String>();

    if answer.trim().is_empty() {
        return Err(SynthesisError::EmptyAnswer);
    }
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenates_text_blocks() {
        let body = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "The sky is blue because of Rayleigh scattering [1]."},
                {"type": "text", "text": " Shorter wavelengths scatter more [2]."}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 20}
        }"#;

        let answer = collect_answer(body).unwrap();
        assert_eq!(
            answer,
            "The sky is blue because of Rayleigh scattering [1]. Shorter wavelengths scatter more [2]."
        );
    }

    #[test]
    fn test_skips_unknown_blocks() {
        let body = r#"{"content": [
            {"type": "thinking", "thinking": "hmm", "signature": "abc"},
            {"type": "text", "text": "Answer [1]"}
        ]}"#;
        assert_eq!(collect_answer(body).unwrap(), "Answer [1]");
    }

    #[test]
    fn test_only_non_text_blocks_is_an_error() {
        let body = r#"{"content": [{"type": "tool_use", "id": "t1", "name": "x", "input": {}}]}"#;
        assert!(matches!(
            collect_answer(body).unwrap_err(),
            SynthesisError::EmptyAnswer
        ));
    }

    #[test]
    fn test_empty_content_is_an_error() {
        assert!(matches!(
            collect_answer(r#"{"content": []}"#).unwrap_err(),
            SynthesisError::EmptyAnswer
        ));
    }

    #[test]
    fn test_missing_content_is_malformed() {
        assert!(matches!(
            collect_answer(r#"{"type": "error"}"#).unwrap_err(),
            SynthesisError::Malformed(_)
        ));
    }

    #[test]
    fn test_request_shape() {
        let request = ApiRequest {
            model: "claude-3-opus-20240229",
            max_tokens: 2000,
            temperature: 0.5,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["system"], SYSTEM_PROMPT);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }
}
