use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ProviderError, ProviderResult, WordProvider, WordRequest};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
const TEMPERATURE: f32 = 0.8;

/// Connection settings for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Bearer token sent with every request.
    pub api_key: String,
    /// Chat model name.
    pub model: String,
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Upper bound for one completion request.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Configuration with the default model, endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a configuration from `OPENAI_*` environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let api_key = non_empty_var("OPENAI_API_KEY").ok_or(ProviderError::MissingEnvVar {
            var: "OPENAI_API_KEY",
        })?;

        let mut config = Self::new(api_key);
        if let Some(model) = non_empty_var("OPENAI_MODEL") {
            config.model = model;
        }
        if let Some(base_url) = non_empty_var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(secs) = non_empty_var("OPENAI_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Generates nouns through the chat completion API.
#[derive(Clone)]
pub struct OpenAiWordProvider {
    client: Client,
    endpoint: Arc<str>,
    api_key: Arc<str>,
    model: Arc<str>,
    timeout: Duration,
}

impl OpenAiWordProvider {
    /// Build the HTTP client for the given configuration.
    pub fn new(config: OpenAiConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| ProviderError::ClientBuilder { source })?;

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint: Arc::from(endpoint),
            api_key: Arc::from(config.api_key),
            model: Arc::from(config.model),
            timeout: config.timeout,
        })
    }

    async fn complete(&self, prompt: String) -> ProviderResult<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        };

        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post(self.endpoint.as_ref())
                .bearer_auth(self.api_key.as_ref())
                .json(&body)
                .send(),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.timeout))?
        .map_err(|source| ProviderError::RequestSend {
            url: self.endpoint.to_string(),
            source,
        })?;

        if !response.status().is_success() {
            return Err(ProviderError::RequestStatus {
                status: response.status(),
            });
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|source| ProviderError::DecodeResponse { source })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyCompletion)
    }
}

impl WordProvider for OpenAiWordProvider {
    fn fetch_words(&self, request: WordRequest) -> BoxFuture<'static, ProviderResult<Vec<String>>> {
        let provider = self.clone();
        Box::pin(async move {
            let content = provider.complete(build_prompt(&request)).await?;
            parse_word_list(&content)
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Human readable language name used in the prompt.
fn language_label(language: &str) -> &'static str {
    match language {
        "de" => "German",
        "ch" => "Swiss German (Züridütsch)",
        _ => "English",
    }
}

fn build_prompt(request: &WordRequest) -> String {
    format!(
        "Give me {} very simple {} nouns in {}. Make sure they vary and avoid using common ones. \
         The chances that you already said them should not be high. Return the words as a JSON array, \
         e.g., [\"word1\", \"word2\", \"word3\"], with no additional wrapping object.",
        request.count,
        request.category,
        language_label(&request.language)
    )
}

/// Decode the completion text into words, tolerating a markdown code fence around the array.
fn parse_word_list(content: &str) -> ProviderResult<Vec<String>> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str::<Vec<String>>(unfenced.trim())
        .map_err(|source| ProviderError::MalformedWordList { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_fenced_arrays() {
        assert_eq!(
            parse_word_list(r#"["cat", "dog"]"#).unwrap(),
            vec!["cat".to_string(), "dog".to_string()]
        );
        assert_eq!(
            parse_word_list("```json\n[\"Haus\"]\n```").unwrap(),
            vec!["Haus".to_string()]
        );
    }

    #[test]
    fn rejects_wrapped_objects() {
        assert!(matches!(
            parse_word_list(r#"{"words": ["cat"]}"#),
            Err(ProviderError::MalformedWordList { .. })
        ));
    }

    #[test]
    fn prompt_names_language_and_category() {
        let prompt = build_prompt(&WordRequest {
            language: "ch".into(),
            category: "animals".into(),
            count: 50,
        });
        assert!(prompt.starts_with("Give me 50 very simple animals nouns in Swiss German"));

        assert_eq!(language_label("de"), "German");
        assert_eq!(language_label("fr"), "English");
    }

    #[tokio::test]
    #[ignore] // Only run with an actual API key
    async fn test_openai_fetch_words() {
        let config = OpenAiConfig::from_env().expect("OPENAI_API_KEY not set");
        let provider = OpenAiWordProvider::new(config).unwrap();

        let words = provider
            .fetch_words(WordRequest {
                language: "en".into(),
                category: "animals".into(),
                count: 5,
            })
            .await
            .unwrap();

        assert!(!words.is_empty());
    }
}
