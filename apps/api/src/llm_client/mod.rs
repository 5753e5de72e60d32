/// LLM Client: the single point of entry for all Gemini API calls.
///
/// No other module talks to the Generative Language API directly. Both
/// collaborators (skill extraction and match explanation) go through here.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The single LLM client shared by all collaborators.
/// Wraps `generateContent` with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to Gemini and returns the generated text.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(
        &self,
        prompt: &str,
        system: Option<&str>,
        max_output_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);
        let request_body = GenerateRequest {
            system_instruction: system.map(|text| Content {
                parts: vec![Part { text }],
            }),
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens,
            },
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: Value = response.json().await?;
            let text = candidate_text(&body).ok_or(LlmError::EmptyContent)?;
            debug!(model = %self.model, chars = text.len(), "LLM call succeeded");
            return Ok(text);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Pulls the generated text out of a `generateContent` response.
///
/// Looks at `candidates[0].content.parts[0].text` first, then a bare string
/// `content`, then top-level `text` / `output`.
pub fn candidate_text(body: &Value) -> Option<String> {
    let content = body.pointer("/candidates/0/content");

    let text = content
        .and_then(|c| c.pointer("/parts/0/text"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .or_else(|| content.and_then(Value::as_str))
        .or_else(|| body.get("text").and_then(Value::as_str))
        .or_else(|| body.get("output").and_then(Value::as_str))?;

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n[\"rust\", \"go\"]\n```";
        assert_eq!(strip_json_fences(input), "[\"rust\", \"go\"]");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"explanation\": \"ok\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"explanation\": \"ok\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"explanation\": \"ok\"}";
        assert_eq!(strip_json_fences(input), "{\"explanation\": \"ok\"}");
    }

    #[test]
    fn test_candidate_text_standard_shape() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": " [\"Python\"] "}], "role": "model"}}]
        });
        assert_eq!(candidate_text(&body).as_deref(), Some("[\"Python\"]"));
    }

    #[test]
    fn test_candidate_text_fallbacks() {
        assert_eq!(
            candidate_text(&json!({"candidates": [{"content": "plain"}]})).as_deref(),
            Some("plain")
        );
        assert_eq!(candidate_text(&json!({"text": "top"})).as_deref(), Some("top"));
        assert_eq!(candidate_text(&json!({"output": "out"})).as_deref(), Some("out"));
    }

    #[test]
    fn test_candidate_text_missing_or_blank() {
        assert!(candidate_text(&json!({"candidates": []})).is_none());
        assert!(candidate_text(&json!({"candidates": [{"finishReason": "MAX_TOKENS"}]})).is_none());
        assert!(candidate_text(&json!({"text": "   "})).is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            system_instruction: None,
            contents: vec![Content {
                parts: vec![Part { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 512,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 512);
        assert!(value.get("systemInstruction").is_none());
    }
}
