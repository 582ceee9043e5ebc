use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use super::category::Category;

pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Raw receipt photograph as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    content_type: String,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    pub fn jpeg(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, DEFAULT_CONTENT_TYPE)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub unit_price: BigDecimal,
    pub quantity: u32,
    pub category: Category,
}

impl LineItem {
    /// Quantity assumed when the receipt does not print one.
    pub const DEFAULT_QUANTITY: u32 = 1;
}

/// Structured extraction of one receipt.
///
/// `total_amount` is the total printed on the receipt as reported by the
/// backend. It is never reconciled against the line items.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub merchant_name: String,
    pub transaction_date: Option<NaiveDate>,
    pub total_amount: BigDecimal,
    pub line_items: Vec<LineItem>,
}

impl Receipt {
    pub fn display_merchant(&self) -> &str {
        let name = self.merchant_name.trim();
        if name.is_empty() { "Unknown" } else { name }
    }

    /// Total rounded to cents, e.g. `"12.50"`.
    pub fn formatted_total(&self) -> String {
        self.total_amount.round(2).with_scale(2).to_string()
    }

    pub fn formatted_date(&self) -> Option<String> {
        self.transaction_date
            .map(|date| date.format("%Y-%m-%d").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn receipt(merchant_name: &str, total: &str) -> Receipt {
        Receipt {
            merchant_name: merchant_name.to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 9),
            total_amount: BigDecimal::from_str(total).unwrap(),
            line_items: vec![],
        }
    }

    #[test]
    fn should_default_image_content_type_to_jpeg() {
        let image = ImagePayload::jpeg(vec![0xFF, 0xD8]);

        assert_eq!(image.content_type(), "image/jpeg");
        assert_eq!(image.len(), 2);
        assert!(!image.is_empty());
    }

    #[test]
    fn should_display_unknown_when_merchant_is_blank() {
        assert_eq!(receipt("   ", "1").display_merchant(), "Unknown");
        assert_eq!(receipt("Corner Shop", "1").display_merchant(), "Corner Shop");
    }

    #[test]
    fn should_format_total_with_two_decimals() {
        assert_eq!(receipt("a", "12.5").formatted_total(), "12.50");
        assert_eq!(receipt("a", "3.456").formatted_total(), "3.46");
        assert_eq!(receipt("a", "7").formatted_total(), "7.00");
    }

    #[test]
    fn should_format_date_as_iso_day() {
        assert_eq!(
            receipt("a", "1").formatted_date(),
            Some("2024-03-09".to_string())
        );
    }
}
