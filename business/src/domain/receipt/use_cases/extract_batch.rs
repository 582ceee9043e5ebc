use async_trait::async_trait;

use crate::domain::receipt::cancellation::BatchCancellation;
use crate::domain::receipt::errors::BatchError;
use crate::domain::receipt::model::ImagePayload;
use crate::domain::receipt::outcome::BatchResult;
use crate::domain::receipt::progress::ProgressCallback;

#[derive(Debug)]
pub struct ExtractBatchParams {
    pub images: Vec<ImagePayload>,
}

#[async_trait]
pub trait ExtractBatchUseCase: Send + Sync {
    /// Checks the batch-level preconditions without extracting anything.
    fn validate(&self, params: &ExtractBatchParams) -> Result<(), BatchError>;

    async fn execute(
        &self,
        params: ExtractBatchParams,
        on_progress: ProgressCallback,
        cancellation: BatchCancellation,
    ) -> Result<BatchResult, BatchError>;
}
