use std::sync::Arc;

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use poem_openapi::payload::{EventStream, Json};
use poem_openapi::{ApiResponse, OpenApi};
use tokio::sync::mpsc;

use business::domain::receipt::cancellation::BatchCancellation;
use business::domain::receipt::progress::{ProgressCallback, ProgressSnapshot};
use business::domain::receipt::use_cases::extract_batch::{
    ExtractBatchParams, ExtractBatchUseCase,
};

use crate::api::error::{ErrorResponse, IntoErrorResponse};
use crate::api::receipt::dto::{BatchEventResponse, BatchResultResponse, ExtractBatchRequest};
use crate::api::tags::ApiTags;

pub struct ReceiptApi {
    extract_batch_use_case: Arc<dyn ExtractBatchUseCase>,
}

impl ReceiptApi {
    pub fn new(extract_batch_use_case: Arc<dyn ExtractBatchUseCase>) -> Self {
        Self {
            extract_batch_use_case,
        }
    }
}

/// Receipt extraction API
///
/// Turns batches of receipt photos into structured receipts.
#[OpenApi]
impl ReceiptApi {
    /// Extract a batch of receipts
    ///
    /// Runs every image concurrently and returns one outcome per image,
    /// in request order. A failed image never fails the batch.
    #[oai(path = "/receipts/extract", method = "post", tag = "ApiTags::Receipts")]
    async fn extract_receipts(&self, body: Json<ExtractBatchRequest>) -> ExtractReceiptsResponse {
        let params = match body.0.into_params() {
            Ok(params) => params,
            Err(err) => {
                let (_status, json) = err.into_error_response();
                return ExtractReceiptsResponse::BadRequest(json);
            }
        };

        let on_progress: ProgressCallback = Arc::new(|snapshot: ProgressSnapshot| {
            tracing::debug!(
                completed = snapshot.completed,
                total = snapshot.total,
                "Batch progress"
            );
        });

        match self
            .extract_batch_use_case
            .execute(params, on_progress, BatchCancellation::new())
            .await
        {
            Ok(result) => ExtractReceiptsResponse::Ok(Json(result.into())),
            Err(err) => {
                let (status, json) = err.into_error_response();
                match status.as_u16() {
                    400 => ExtractReceiptsResponse::BadRequest(json),
                    _ => ExtractReceiptsResponse::InternalError(json),
                }
            }
        }
    }

    /// Extract a batch of receipts with live progress
    ///
    /// Streams a `progress` event per finished image, then one `completed`
    /// event carrying the full result. Batch-level problems are rejected
    /// with 400 before the stream opens. Closing the connection cancels the
    /// images still in flight.
    #[oai(
        path = "/receipts/extract/stream",
        method = "post",
        tag = "ApiTags::Receipts"
    )]
    async fn extract_receipts_stream(
        &self,
        body: Json<ExtractBatchRequest>,
    ) -> ExtractReceiptsStreamResponse {
        let params = match body.0.into_params() {
            Ok(params) => params,
            Err(err) => {
                let (_status, json) = err.into_error_response();
                return ExtractReceiptsStreamResponse::BadRequest(json);
            }
        };
        if let Err(err) = self.extract_batch_use_case.validate(&params) {
            let (_status, json) = err.into_error_response();
            return ExtractReceiptsStreamResponse::BadRequest(json);
        }

        let events = batch_events(self.extract_batch_use_case.clone(), params);
        ExtractReceiptsStreamResponse::Ok(
            EventStream::new(events).to_event(BatchEventResponse::into_sse_event),
        )
    }
}

/// Cancels the batch when the event stream is dropped.
struct CancelOnDrop(BatchCancellation);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

fn batch_events(
    use_case: Arc<dyn ExtractBatchUseCase>,
    params: ExtractBatchParams,
) -> BoxStream<'static, BatchEventResponse> {
    let (sender, receiver) = mpsc::unbounded_channel();
    let cancellation = BatchCancellation::new();

    let progress_sender = sender.clone();
    let on_progress: ProgressCallback = Arc::new(move |snapshot: ProgressSnapshot| {
        // A closed receiver means the client went away; cancellation follows.
        let _ = progress_sender.send(BatchEventResponse::progress(snapshot));
    });

    let batch_cancellation = cancellation.clone();
    tokio::spawn(async move {
        let event = match use_case
            .execute(params, on_progress, batch_cancellation)
            .await
        {
            Ok(result) => BatchEventResponse::completed(result),
            Err(err) => BatchEventResponse::failed(err),
        };
        let _ = sender.send(event);
    });

    stream::unfold(
        (receiver, CancelOnDrop(cancellation)),
        |(mut receiver, guard)| async move {
            receiver
                .recv()
                .await
                .map(|event| (event, (receiver, guard)))
        },
    )
    .boxed()
}

#[derive(ApiResponse)]
enum ExtractReceiptsResponse {
    #[oai(status = 200)]
    Ok(Json<BatchResultResponse>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

#[derive(ApiResponse)]
enum ExtractReceiptsStreamResponse {
    #[oai(status = 200)]
    Ok(EventStream<BoxStream<'static, BatchEventResponse>>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use business::domain::receipt::errors::{BatchError, ExtractionError};
    use business::domain::receipt::model::{ImagePayload, Receipt};
    use business::domain::receipt::outcome::{BatchResult, ExtractionOutcome};

    use crate::api::receipt::dto::{BatchEventKindDto, ImageRequest};

    /// Reports one progress step per image and succeeds every image.
    struct CountingUseCase;

    #[async_trait]
    impl ExtractBatchUseCase for CountingUseCase {
        fn validate(&self, _params: &ExtractBatchParams) -> Result<(), BatchError> {
            Ok(())
        }

        async fn execute(
            &self,
            params: ExtractBatchParams,
            on_progress: ProgressCallback,
            _cancellation: BatchCancellation,
        ) -> Result<BatchResult, BatchError> {
            let total = params.images.len();
            on_progress(ProgressSnapshot { completed: 0, total });
            for completed in 1..=total {
                on_progress(ProgressSnapshot { completed, total });
            }
            Ok(BatchResult::new(
                (0..total)
                    .map(|_| ExtractionOutcome::Success(receipt()))
                    .collect(),
            ))
        }
    }

    struct RejectingUseCase;

    #[async_trait]
    impl ExtractBatchUseCase for RejectingUseCase {
        fn validate(&self, params: &ExtractBatchParams) -> Result<(), BatchError> {
            Err(BatchError::TooManyImages {
                count: params.images.len(),
                max: 0,
            })
        }

        async fn execute(
            &self,
            _params: ExtractBatchParams,
            _on_progress: ProgressCallback,
            _cancellation: BatchCancellation,
        ) -> Result<BatchResult, BatchError> {
            Err(BatchError::TooManyImages { count: 1, max: 0 })
        }
    }

    /// Waits for cancellation and reports whether it arrived.
    struct WaitingUseCase {
        cancelled: mpsc::UnboundedSender<()>,
    }

    #[async_trait]
    impl ExtractBatchUseCase for WaitingUseCase {
        fn validate(&self, _params: &ExtractBatchParams) -> Result<(), BatchError> {
            Ok(())
        }

        async fn execute(
            &self,
            params: ExtractBatchParams,
            on_progress: ProgressCallback,
            cancellation: BatchCancellation,
        ) -> Result<BatchResult, BatchError> {
            let total = params.images.len();
            on_progress(ProgressSnapshot { completed: 0, total });
            cancellation.cancelled().await;
            let _ = self.cancelled.send(());
            Ok(BatchResult::new(
                (0..total)
                    .map(|_| ExtractionOutcome::Failure(ExtractionError::Cancelled))
                    .collect(),
            ))
        }
    }

    fn receipt() -> Receipt {
        Receipt {
            merchant_name: "Cafe".to_string(),
            transaction_date: None,
            total_amount: 0.into(),
            line_items: vec![],
        }
    }

    fn params(count: usize) -> ExtractBatchParams {
        ExtractBatchParams {
            images: (0..count)
                .map(|i| ImagePayload::jpeg(vec![i as u8 + 1]))
                .collect(),
        }
    }

    #[tokio::test]
    async fn should_stream_progress_then_completion() {
        let events: Vec<BatchEventResponse> =
            batch_events(Arc::new(CountingUseCase), params(2)).collect().await;

        let kinds: Vec<BatchEventKindDto> = events.iter().map(|e| e.event).collect();
        assert_eq!(
            kinds,
            vec![
                BatchEventKindDto::Progress,
                BatchEventKindDto::Progress,
                BatchEventKindDto::Progress,
                BatchEventKindDto::Completed,
            ]
        );
        let completed: Vec<u64> = events.iter().take(3).map(|e| e.completed).collect();
        assert_eq!(completed, vec![0, 1, 2]);

        let result = events[3].result.as_ref().unwrap();
        assert_eq!(result.outcomes.len(), 2);
        assert_eq!(result.succeeded, 2);
    }

    #[tokio::test]
    async fn should_end_stream_with_failure_event_when_batch_is_rejected() {
        let events: Vec<BatchEventResponse> =
            batch_events(Arc::new(RejectingUseCase), params(1)).collect().await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, BatchEventKindDto::Failed);
        assert_eq!(events[0].error.as_deref(), Some("batch.too_many_images"));
    }

    #[tokio::test]
    async fn should_cancel_batch_when_stream_is_dropped() {
        let (sender, mut cancelled) = mpsc::unbounded_channel();
        let mut events = batch_events(Arc::new(WaitingUseCase { cancelled: sender }), params(3));

        let first = events.next().await.unwrap();
        assert_eq!(first.event, BatchEventKindDto::Progress);
        drop(events);

        let signal = tokio::time::timeout(Duration::from_secs(1), cancelled.recv()).await;
        assert_eq!(signal.unwrap(), Some(()));
    }

    #[tokio::test]
    async fn should_reject_oversized_stream_request_before_opening_the_stream() {
        let api = ReceiptApi::new(Arc::new(RejectingUseCase));
        let body = ExtractBatchRequest {
            images: vec![ImageRequest {
                image_base64: "YWJj".to_string(),
                content_type: None,
            }],
        };

        let response = api.extract_receipts_stream(Json(body)).await;

        match response {
            ExtractReceiptsStreamResponse::BadRequest(json) => {
                assert_eq!(json.0.message, "batch.too_many_images");
            }
            ExtractReceiptsStreamResponse::Ok(_) => panic!("stream opened for a rejected batch"),
        }
    }
}
