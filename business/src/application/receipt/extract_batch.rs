use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::domain::logger::Logger;
use crate::domain::receipt::cancellation::BatchCancellation;
use crate::domain::receipt::errors::{BatchError, ExtractionError};
use crate::domain::receipt::model::ImagePayload;
use crate::domain::receipt::outcome::{BatchResult, ExtractionOutcome};
use crate::domain::receipt::progress::{ProgressAggregator, ProgressCallback, ProgressSnapshot};
use crate::domain::receipt::services::ReceiptExtractor;
use crate::domain::receipt::use_cases::extract_batch::{ExtractBatchParams, ExtractBatchUseCase};

/// Limits applied to every batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchConfig {
    /// Largest accepted batch; `None` accepts any size.
    pub max_images: Option<usize>,
    /// Extractions allowed in flight at once; `None` runs every image at once.
    pub max_concurrency: Option<usize>,
}

/// Fans a batch of receipt images out to the extractor and collects one
/// outcome per image.
///
/// Every image runs as its own task. A failing or panicking extraction only
/// affects its own slot. Progress is reported from the single join loop, so
/// snapshots arrive strictly in completion order and the slot for an image is
/// always written before the snapshot that counts it.
pub struct BatchOrchestrator {
    pub extractor: Arc<dyn ReceiptExtractor>,
    pub logger: Arc<dyn Logger>,
    pub config: BatchConfig,
}

impl BatchOrchestrator {
    pub async fn run(
        &self,
        images: Vec<ImagePayload>,
        on_progress: impl Fn(ProgressSnapshot) + Send + Sync,
    ) -> Result<BatchResult, BatchError> {
        self.run_with_cancellation(images, &on_progress, BatchCancellation::new())
            .await
    }

    pub async fn run_with_cancellation(
        &self,
        images: Vec<ImagePayload>,
        on_progress: &(dyn Fn(ProgressSnapshot) + Send + Sync),
        cancellation: BatchCancellation,
    ) -> Result<BatchResult, BatchError> {
        self.check_batch(&images)?;

        let batch_id = Uuid::new_v4();
        let total = images.len();
        let mut progress = ProgressAggregator::new(total);

        self.logger.info(&format!(
            "Batch {}: extracting {} receipt images",
            batch_id, total
        ));
        on_progress(progress.snapshot());

        let permits = self
            .config
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        let mut units: JoinSet<(usize, ExtractionOutcome)> = JoinSet::new();

        for (index, image) in images.into_iter().enumerate() {
            if let Err(err) = Self::check_payload(&image) {
                units.spawn(async move { (index, ExtractionOutcome::Failure(err)) });
                continue;
            }

            let extractor = self.extractor.clone();
            let permits = permits.clone();
            let cancellation = cancellation.clone();

            units.spawn(async move {
                let _permit = match permits {
                    Some(semaphore) => match semaphore.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => {
                            return (index, ExtractionOutcome::Failure(ExtractionError::Cancelled));
                        }
                    },
                    None => None,
                };
                if cancellation.is_cancelled() {
                    return (index, ExtractionOutcome::Failure(ExtractionError::Cancelled));
                }

                let result = AssertUnwindSafe(extractor.extract(&image))
                    .catch_unwind()
                    .await
                    .unwrap_or(Err(ExtractionError::UnitPanicked));
                (index, result.into())
            });
        }

        let mut slots: Vec<Option<ExtractionOutcome>> = (0..total).map(|_| None).collect();
        let mut cancelled = false;

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancellation.cancelled(), if !cancelled => {
                    cancelled = true;
                    units.detach_all();
                    None
                }
                joined = units.join_next() => joined,
            };
            let Some(joined) = joined else { break };

            let (index, outcome) = match joined {
                Ok(done) => done,
                Err(err) => {
                    self.logger
                        .error(&format!("Batch {}: extraction task lost: {}", batch_id, err));
                    continue;
                }
            };

            if let ExtractionOutcome::Failure(err) = &outcome {
                self.logger.warn(&format!(
                    "Batch {}: image {} failed: {}",
                    batch_id, index, err
                ));
            }
            slots[index] = Some(outcome);
            on_progress(progress.record_completion());
        }

        if cancelled {
            self.logger.warn(&format!(
                "Batch {}: cancelled after {} of {} extractions",
                batch_id,
                progress.snapshot().completed,
                total
            ));
        }

        let mut outcomes = Vec::with_capacity(total);
        for slot in slots {
            let outcome = match slot {
                Some(outcome) => outcome,
                None if cancelled => ExtractionOutcome::Failure(ExtractionError::Cancelled),
                None => {
                    on_progress(progress.record_completion());
                    ExtractionOutcome::Failure(ExtractionError::UnitPanicked)
                }
            };
            outcomes.push(outcome);
        }

        let result = BatchResult::new(outcomes);
        self.logger.info(&format!(
            "Batch {}: finished, {} succeeded, {} failed",
            batch_id,
            result.succeeded(),
            result.failed()
        ));

        Ok(result)
    }

    fn check_batch(&self, images: &[ImagePayload]) -> Result<(), BatchError> {
        match self.config.max_images {
            Some(max) if images.len() > max => Err(BatchError::TooManyImages {
                count: images.len(),
                max,
            }),
            _ => Ok(()),
        }
    }

    /// Rejects a single image that cannot be sent to the extractor.
    fn check_payload(image: &ImagePayload) -> Result<(), ExtractionError> {
        if image.is_empty() {
            return Err(ExtractionError::EmptyImage);
        }
        if !image
            .content_type()
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
        {
            return Err(ExtractionError::UnsupportedContentType);
        }
        Ok(())
    }
}

#[async_trait]
impl ExtractBatchUseCase for BatchOrchestrator {
    fn validate(&self, params: &ExtractBatchParams) -> Result<(), BatchError> {
        self.check_batch(&params.images)
    }

    async fn execute(
        &self,
        params: ExtractBatchParams,
        on_progress: ProgressCallback,
        cancellation: BatchCancellation,
    ) -> Result<BatchResult, BatchError> {
        self.run_with_cancellation(params.images, on_progress.as_ref(), cancellation)
            .await
    }
}
