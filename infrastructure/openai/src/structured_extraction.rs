use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

use business::domain::receipt::errors::ExtractionError;
use business::domain::receipt::schema::{SCHEMA_NAME, USER_PROMPT};
use business::domain::receipt::services::ExtractionBackend;

use crate::client::OpenAIClient;

/// Structured-output extraction over the OpenAI Responses API.
pub struct StructuredExtractionOpenAI {
    client: OpenAIClient,
}

impl StructuredExtractionOpenAI {
    pub fn new(client: OpenAIClient) -> Self {
        Self { client }
    }

    pub fn model(&self) -> &str {
        &self.client.model
    }

    fn to_data_url(image: &[u8], content_type: &str) -> String {
        format!("data:{};base64,{}", content_type, STANDARD.encode(image))
    }

    fn build_body(
        &self,
        image: &[u8],
        content_type: &str,
        schema: &Value,
        system_instruction: &str,
    ) -> Value {
        json!({
            "model": self.client.model,
            "input": [
                {"role": "system", "content": system_instruction},
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "input_text",
                            "text": USER_PROMPT,
                        },
                        {
                            "type": "input_image",
                            "image_url": Self::to_data_url(image, content_type),
                            "detail": "high",
                        },
                    ],
                },
            ],
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": SCHEMA_NAME,
                    "schema": schema,
                    "strict": true,
                },
            },
            "temperature": 0.1,
        })
    }

    /// Pulls the structured value out of a Responses API payload.
    fn parse_output(data: &Value) -> Result<Value, ExtractionError> {
        if data["status"] == "incomplete" {
            return Err(ExtractionError::MalformedResponse);
        }

        let contents = data["output"]
            .as_array()
            .and_then(|outputs| outputs.iter().find(|o| o["type"] == "message"))
            .and_then(|msg| msg["content"].as_array())
            .ok_or(ExtractionError::NoResultReturned)?;

        if contents.iter().any(|c| c["type"] == "refusal") {
            return Err(ExtractionError::NoResultReturned);
        }

        let text = contents
            .iter()
            .find(|c| c["type"] == "output_text")
            .and_then(|c| c["text"].as_str())
            .ok_or(ExtractionError::NoResultReturned)?;

        serde_json::from_str(text).map_err(|_| ExtractionError::MalformedResponse)
    }
}

#[async_trait]
impl ExtractionBackend for StructuredExtractionOpenAI {
    async fn submit_structured_extraction(
        &self,
        image: &[u8],
        content_type: &str,
        schema: &Value,
        system_instruction: &str,
    ) -> Result<Value, ExtractionError> {
        let body = self.build_body(image, content_type, schema, system_instruction);

        let response = self
            .client
            .client
            .post(self.client.responses_url())
            .header("Content-Type", "application/json")
            .header("Authorization", self.client.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "OpenAI request failed");
                ExtractionError::BackendUnavailable
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "OpenAI returned an error status");
            return Err(ExtractionError::BackendUnavailable);
        }

        let data: Value = response
            .json()
            .await
            .map_err(|_| ExtractionError::MalformedResponse)?;

        Self::parse_output(&data)
    }
}
