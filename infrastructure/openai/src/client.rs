use std::time::Duration;

use reqwest::Client;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared OpenAI HTTP client configuration.
pub struct OpenAIClient {
    pub client: Client,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl OpenAIClient {
    pub fn new(api_key: String) -> Self {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT)
    }

    /// Client for an OpenAI-compatible endpoint, e.g. an Azure deployment.
    pub fn with_options(
        api_key: String,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Builds the authorization header value.
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Returns the responses endpoint URL.
    pub fn responses_url(&self) -> String {
        format!("{}/responses", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_public_endpoint_and_model() {
        let client = OpenAIClient::new("sk-test".to_string());

        assert_eq!(client.responses_url(), "https://api.openai.com/v1/responses");
        assert_eq!(client.model, "gpt-4o");
        assert_eq!(client.auth_header(), "Bearer sk-test");
    }

    #[test]
    fn should_trim_trailing_slash_from_custom_endpoint() {
        let client = OpenAIClient::with_options(
            "key".to_string(),
            "https://example.openai.azure.com/openai/v1/",
            "receipts-gpt4o",
            Duration::from_secs(5),
        );

        assert_eq!(
            client.responses_url(),
            "https://example.openai.azure.com/openai/v1/responses"
        );
        assert_eq!(client.model, "receipts-gpt4o");
    }
}
