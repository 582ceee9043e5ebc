use async_trait::async_trait;
use serde_json::Value;

use super::errors::ExtractionError;
use super::model::{ImagePayload, Receipt};

/// Service port for the structured-extraction backend.
///
/// Implementations make exactly one outbound call and return the structured
/// value the backend produced, untouched. Interpreting it is the caller's job.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    async fn submit_structured_extraction(
        &self,
        image: &[u8],
        content_type: &str,
        schema: &Value,
        system_instruction: &str,
    ) -> Result<Value, ExtractionError>;
}

/// Service port for turning one receipt image into a `Receipt`.
#[async_trait]
pub trait ReceiptExtractor: Send + Sync {
    async fn extract(&self, image: &ImagePayload) -> Result<Receipt, ExtractionError>;
}
