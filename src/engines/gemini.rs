use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::ScriptGenerator;
use crate::config::{PROMPT_PLACEHOLDER, ScriptConfig};

/// Narration writer backed by the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiScriptGenerator {
    config: ScriptConfig,
}

impl GeminiScriptGenerator {
    pub fn new(config: ScriptConfig) -> Self {
        Self { config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn api_key(&self) -> Result<String> {
        let name = &self.config.api_key_env;
        std::env::var(name)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .with_context(|| format!("Set {name} to use prompt-based script generation"))
    }
}

/// Substitute the quoted, trimmed user input for `{{prompt}}`.
pub fn render_prompt(template: &str, user_input: &str) -> String {
    template.replace(PROMPT_PLACEHOLDER, &format!("\"{}\"", user_input.trim()))
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Concatenated text parts of the first candidate.
fn extract_text(body: &str) -> Result<String> {
    let response: GenerateResponse =
        serde_json::from_str(body).context("Unexpected response from the Gemini API")?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().map(|part| part.text).collect())
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        bail!("Gemini returned no text");
    }
    Ok(text.to_string())
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

impl ScriptGenerator for GeminiScriptGenerator {
    fn generate(&self, user_input: &str) -> Result<String> {
        let api_key = self.api_key()?;
        let prompt = render_prompt(&self.config.prompt_template, user_input);

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("reelgen/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: &prompt }],
            }],
        };

        let response = client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .with_context(|| format!("Failed to reach {}", self.config.base_url))?;

        let status = response.status();
        let body = response
            .text()
            .context("Failed to read the Gemini response")?;

        if !status.is_success() {
            bail!("HTTP {}: {}", status, api_error_message(&body));
        }

        extract_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_quoted_and_trimmed() {
        assert_eq!(
            render_prompt("Write about {{prompt}} now", "  black holes \n"),
            "Write about \"black holes\" now"
        );
    }

    #[test]
    fn every_placeholder_is_replaced() {
        assert_eq!(render_prompt("{{prompt}} / {{prompt}}", "x"), "\"x\" / \"x\"");
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let generator = GeminiScriptGenerator::new(ScriptConfig {
            base_url: "https://example.test/v1beta/".to_string(),
            model: "gemini-pro".to_string(),
            ..ScriptConfig::default()
        });
        assert_eq!(
            generator.endpoint(),
            "https://example.test/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn candidate_parts_are_joined() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Le soleil "}, {"text": "se lève.\n"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        assert_eq!(extract_text(body).unwrap(), "Le soleil se lève.");
    }

    #[test]
    fn empty_candidates_are_an_error() {
        assert!(extract_text(r#"{"candidates": []}"#).is_err());
        assert!(extract_text(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).is_err());
    }

    #[test]
    fn api_errors_are_unwrapped() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid");
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let generator = GeminiScriptGenerator::new(ScriptConfig {
            api_key_env: "REELGEN_TEST_UNSET_API_KEY".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            ..ScriptConfig::default()
        });
        let err = generator.generate("anything").unwrap_err();
        assert!(err.to_string().contains("REELGEN_TEST_UNSET_API_KEY"));
    }
}
