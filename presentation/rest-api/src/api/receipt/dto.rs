use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use poem::web::sse::Event;
use poem_openapi::types::ToJSON;
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};

use business::domain::receipt::category::Category;
use business::domain::receipt::errors::BatchError;
use business::domain::receipt::model::{DEFAULT_CONTENT_TYPE, ImagePayload, LineItem, Receipt};
use business::domain::receipt::outcome::{BatchResult, ExtractionOutcome};
use business::domain::receipt::progress::ProgressSnapshot;
use business::domain::receipt::use_cases::extract_batch::ExtractBatchParams;

#[derive(Debug, thiserror::Error)]
pub enum ImageDecodeError {
    #[error("receipt.invalid_base64")]
    InvalidBase64 { index: usize },
}

// --- Requests ---

/// A single receipt photograph.
#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct ImageRequest {
    /// Base64-encoded image data, optionally as a `data:image/...;base64,` URL
    pub image_base64: String,
    /// MIME type of the image (default: taken from the data URL, else image/jpeg)
    #[oai(skip_serializing_if_is_none)]
    pub content_type: Option<String>,
}

impl ImageRequest {
    fn split_data_url(raw: &str) -> (Option<String>, &str) {
        let Ok(re) = regex::Regex::new(r"^data:([\w.+-]+/[\w.+-]+);base64,") else {
            return (None, raw);
        };
        match re.captures(raw) {
            Some(caps) => {
                let body_start = caps.get(0).map_or(0, |m| m.end());
                (caps.get(1).map(|m| m.as_str().to_string()), &raw[body_start..])
            }
            None => (None, raw),
        }
    }

    fn decode(self, index: usize) -> Result<ImagePayload, ImageDecodeError> {
        let (url_content_type, body) = Self::split_data_url(self.image_base64.trim());
        let clean: String = body.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(clean)
            .map_err(|_| ImageDecodeError::InvalidBase64 { index })?;

        let content_type = self
            .content_type
            .or(url_content_type)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Ok(ImagePayload::new(bytes, content_type))
    }
}

/// Request to extract a batch of receipts.
#[derive(Debug, Clone, Object)]
pub struct ExtractBatchRequest {
    /// Receipt images, in the order results should be returned
    pub images: Vec<ImageRequest>,
}

impl ExtractBatchRequest {
    pub fn into_params(self) -> Result<ExtractBatchParams, ImageDecodeError> {
        let images = self
            .images
            .into_iter()
            .enumerate()
            .map(|(index, image)| image.decode(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExtractBatchParams { images })
    }
}

// --- Receipts ---

#[derive(Debug, Clone, Serialize, Deserialize, Enum)]
pub enum CategoryDto {
    #[oai(rename = "Unknown")]
    Unknown,
    #[oai(rename = "Groceries")]
    Groceries,
    #[oai(rename = "Clothing")]
    Clothing,
    #[oai(rename = "AutoRepair")]
    AutoRepair,
    #[oai(rename = "Utilities")]
    Utilities,
    #[oai(rename = "PreparedFood")]
    PreparedFood,
    #[oai(rename = "Entertainment")]
    Entertainment,
    #[oai(rename = "Phone")]
    Phone,
    #[oai(rename = "Household")]
    Household,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        match category {
            Category::Unknown => CategoryDto::Unknown,
            Category::Groceries => CategoryDto::Groceries,
            Category::Clothing => CategoryDto::Clothing,
            Category::AutoRepair => CategoryDto::AutoRepair,
            Category::Utilities => CategoryDto::Utilities,
            Category::PreparedFood => CategoryDto::PreparedFood,
            Category::Entertainment => CategoryDto::Entertainment,
            Category::Phone => CategoryDto::Phone,
            Category::Household => CategoryDto::Household,
        }
    }
}

#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct LineItemResponse {
    /// Item description as printed
    pub description: String,
    /// Price of one unit, as a decimal string
    pub unit_price: String,
    /// Units purchased (1 when the receipt prints none)
    pub quantity: u32,
    /// Spending category
    pub category: CategoryDto,
}

impl From<LineItem> for LineItemResponse {
    fn from(item: LineItem) -> Self {
        Self {
            description: item.description,
            unit_price: item.unit_price.to_string(),
            quantity: item.quantity,
            category: item.category.into(),
        }
    }
}

#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct ReceiptResponse {
    /// Merchant name as extracted (may be empty)
    pub merchant_name: String,
    /// Merchant name for display ("Unknown" when empty)
    pub display_merchant: String,
    /// Transaction date, absent when not detected
    #[oai(skip_serializing_if_is_none)]
    pub transaction_date: Option<NaiveDate>,
    /// Total printed on the receipt, as a decimal string
    pub total_amount: String,
    /// Total rounded to two decimals
    pub formatted_total: String,
    /// Purchased items in printed order
    pub line_items: Vec<LineItemResponse>,
}

impl From<Receipt> for ReceiptResponse {
    fn from(receipt: Receipt) -> Self {
        Self {
            display_merchant: receipt.display_merchant().to_string(),
            formatted_total: receipt.formatted_total(),
            total_amount: receipt.total_amount.to_string(),
            transaction_date: receipt.transaction_date,
            merchant_name: receipt.merchant_name,
            line_items: receipt.line_items.into_iter().map(Into::into).collect(),
        }
    }
}

// --- Batch results ---

#[derive(Debug, Clone, Serialize, Deserialize, Enum)]
pub enum OutcomeStatusDto {
    #[oai(rename = "success")]
    Success,
    #[oai(rename = "failure")]
    Failure,
}

#[derive(Debug, Clone, Object)]
pub struct ExtractionOutcomeResponse {
    /// Position of the image in the request
    pub index: u64,
    /// Whether extraction succeeded
    pub status: OutcomeStatusDto,
    /// Extracted receipt, on success
    #[oai(skip_serializing_if_is_none)]
    pub receipt: Option<ReceiptResponse>,
    /// Failure code, on failure
    #[oai(skip_serializing_if_is_none)]
    pub reason: Option<String>,
}

impl ExtractionOutcomeResponse {
    fn new(index: usize, outcome: ExtractionOutcome) -> Self {
        match outcome {
            ExtractionOutcome::Success(receipt) => Self {
                index: index as u64,
                status: OutcomeStatusDto::Success,
                receipt: Some(receipt.into()),
                reason: None,
            },
            ExtractionOutcome::Failure(error) => Self {
                index: index as u64,
                status: OutcomeStatusDto::Failure,
                receipt: None,
                reason: Some(error.to_string()),
            },
        }
    }
}

/// Batch extraction result, one outcome per submitted image.
#[derive(Debug, Clone, Object)]
pub struct BatchResultResponse {
    /// Outcomes in request order
    pub outcomes: Vec<ExtractionOutcomeResponse>,
    /// Number of successful extractions
    pub succeeded: u64,
    /// Number of failed extractions
    pub failed: u64,
}

impl From<BatchResult> for BatchResultResponse {
    fn from(result: BatchResult) -> Self {
        let succeeded = result.succeeded() as u64;
        let failed = result.failed() as u64;
        Self {
            outcomes: result
                .into_iter()
                .enumerate()
                .map(|(index, outcome)| ExtractionOutcomeResponse::new(index, outcome))
                .collect(),
            succeeded,
            failed,
        }
    }
}

// --- Streaming events ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
pub enum BatchEventKindDto {
    #[oai(rename = "progress")]
    Progress,
    #[oai(rename = "completed")]
    Completed,
    #[oai(rename = "failed")]
    Failed,
}

impl BatchEventKindDto {
    pub fn name(self) -> &'static str {
        match self {
            BatchEventKindDto::Progress => "progress",
            BatchEventKindDto::Completed => "completed",
            BatchEventKindDto::Failed => "failed",
        }
    }
}

/// Server-sent event emitted while a batch runs.
#[derive(Debug, Clone, Object)]
pub struct BatchEventResponse {
    /// Event kind
    pub event: BatchEventKindDto,
    /// Extractions finished so far
    pub completed: u64,
    /// Images in the batch
    pub total: u64,
    /// completed / total, 0 for an empty batch
    pub fraction: f64,
    /// Final result, on the completed event
    #[oai(skip_serializing_if_is_none)]
    pub result: Option<BatchResultResponse>,
    /// Error code, on the failed event
    #[oai(skip_serializing_if_is_none)]
    pub error: Option<String>,
}

impl BatchEventResponse {
    pub fn progress(snapshot: ProgressSnapshot) -> Self {
        Self {
            event: BatchEventKindDto::Progress,
            completed: snapshot.completed as u64,
            total: snapshot.total as u64,
            fraction: snapshot.fraction(),
            result: None,
            error: None,
        }
    }

    pub fn completed(result: BatchResult) -> Self {
        let total = result.len() as u64;
        Self {
            event: BatchEventKindDto::Completed,
            completed: total,
            total,
            fraction: if total == 0 { 0.0 } else { 1.0 },
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn failed(error: BatchError) -> Self {
        Self {
            event: BatchEventKindDto::Failed,
            completed: 0,
            total: 0,
            fraction: 0.0,
            result: None,
            error: Some(error.to_string()),
        }
    }

    /// SSE frame named after the event kind, with the JSON body as data.
    pub fn into_sse_event(self) -> Event {
        Event::message(self.to_json_string()).event_type(self.event.name())
    }
}
