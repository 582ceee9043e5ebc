use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::logger::Logger;
use crate::domain::receipt::category::Category;
use crate::domain::receipt::errors::ExtractionError;
use crate::domain::receipt::model::{ImagePayload, LineItem, Receipt};
use crate::domain::receipt::schema::{SYSTEM_INSTRUCTION, receipt_schema};
use crate::domain::receipt::services::{ExtractionBackend, ReceiptExtractor};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    merchant_name: Option<String>,
    transaction_date: Option<String>,
    total_amount: Option<RawAmount>,
    line_items: Option<Vec<RawLineItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLineItem {
    description: Option<String>,
    #[serde(alias = "price")]
    unit_price: Option<RawAmount>,
    quantity: Option<serde_json::Number>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

/// Sends one image with the fixed receipt instruction and schema, then applies
/// the defaulting rules to whatever the backend answered.
pub struct ExtractionClient {
    pub backend: Arc<dyn ExtractionBackend>,
    pub logger: Arc<dyn Logger>,
    schema: Value,
}

impl ExtractionClient {
    pub fn new(backend: Arc<dyn ExtractionBackend>, logger: Arc<dyn Logger>) -> Self {
        Self {
            backend,
            logger,
            schema: receipt_schema(),
        }
    }

    fn to_receipt(value: Value) -> Result<Receipt, ExtractionError> {
        if value.is_null() {
            return Err(ExtractionError::NoResultReturned);
        }
        if !value.is_object() {
            return Err(ExtractionError::MalformedResponse);
        }

        let raw: RawReceipt =
            serde_json::from_value(value).map_err(|_| ExtractionError::MalformedResponse)?;

        let total_amount = raw
            .total_amount
            .map(Self::parse_amount)
            .transpose()?
            .unwrap_or_else(BigDecimal::zero);

        let line_items = raw
            .line_items
            .unwrap_or_default()
            .into_iter()
            .map(Self::to_line_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Receipt {
            merchant_name: raw.merchant_name.unwrap_or_default().trim().to_string(),
            transaction_date: raw.transaction_date.as_deref().and_then(Self::parse_date),
            total_amount,
            line_items,
        })
    }

    fn to_line_item(raw: RawLineItem) -> Result<LineItem, ExtractionError> {
        let quantity = match raw.quantity {
            None => LineItem::DEFAULT_QUANTITY,
            Some(number) => Self::parse_quantity(&number)?,
        };

        Ok(LineItem {
            description: raw.description.unwrap_or_default().trim().to_string(),
            unit_price: raw
                .unit_price
                .map(Self::parse_amount)
                .transpose()?
                .unwrap_or_else(BigDecimal::zero),
            quantity,
            category: raw
                .category
                .as_deref()
                .map(Category::from_label)
                .unwrap_or_default(),
        })
    }

    fn parse_quantity(number: &serde_json::Number) -> Result<u32, ExtractionError> {
        let whole = number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        });

        whole
            .and_then(|q| u32::try_from(q).ok())
            .ok_or(ExtractionError::MalformedResponse)
    }

    fn parse_amount(raw: RawAmount) -> Result<BigDecimal, ExtractionError> {
        let text = match raw {
            RawAmount::Number(number) => number.to_string(),
            RawAmount::Text(text) => regex::Regex::new(r"^[^\d\-.]+")
                .map(|re| re.replace(text.trim(), "").to_string())
                .unwrap_or(text),
        };

        BigDecimal::from_str(text.trim()).map_err(|_| ExtractionError::MalformedResponse)
    }

    /// Unreadable dates count as undetected rather than failing the receipt.
    fn parse_date(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                    .ok()
                    .map(|d| d.date())
            })
    }
}

#[async_trait]
impl ReceiptExtractor for ExtractionClient {
    async fn extract(&self, image: &ImagePayload) -> Result<Receipt, ExtractionError> {
        self.logger.debug(&format!(
            "Submitting receipt image ({} bytes, {})",
            image.len(),
            image.content_type()
        ));

        let value = self
            .backend
            .submit_structured_extraction(
                image.bytes(),
                image.content_type(),
                &self.schema,
                SYSTEM_INSTRUCTION,
            )
            .await?;

        let receipt = Self::to_receipt(value).inspect_err(|err| {
            self.logger
                .warn(&format!("Structured response rejected: {}", err));
        })?;

        self.logger.debug(&format!(
            "Receipt extracted: {} line items",
            receipt.line_items.len()
        ));

        Ok(receipt)
    }
}
