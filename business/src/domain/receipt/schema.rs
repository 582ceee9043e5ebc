use serde_json::{Value, json};

use super::category::Category;

pub const SCHEMA_NAME: &str = "receipt";

pub const SYSTEM_INSTRUCTION: &str = r#"You are a receipt OCR assistant. Extract all information from the receipt image.
Return ONLY data matching the provided JSON schema.
- "merchantName": the store or business name as printed, or "" if unreadable
- "transactionDate": the purchase date as YYYY-MM-DD, or null if you cannot find one (never invent a date)
- "totalAmount": the total printed on the receipt, as a number
- "lineItems": every purchased item, in printed order
  - "quantity": use 1 for items without a quantity
  - "unitPrice": the price of one unit, as a number
  - "category": one of the allowed labels; if you cannot find a strong category match, use "Unknown""#;

pub const USER_PROMPT: &str = "Extract all information from this receipt:";

/// JSON schema the backend must answer with. Every property is required and
/// optional values are expressed as nullable types, as strict structured
/// output modes demand.
pub fn receipt_schema() -> Value {
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();

    json!({
        "type": "object",
        "properties": {
            "merchantName": {"type": "string"},
            "transactionDate": {
                "type": ["string", "null"],
                "description": "Purchase date formatted as YYYY-MM-DD",
            },
            "totalAmount": {"type": "number"},
            "lineItems": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "description": {"type": "string"},
                        "unitPrice": {"type": "number"},
                        "quantity": {"type": ["integer", "null"]},
                        "category": {"type": "string", "enum": categories},
                    },
                    "required": ["description", "unitPrice", "quantity", "category"],
                    "additionalProperties": false,
                },
            },
        },
        "required": ["merchantName", "transactionDate", "totalAmount", "lineItems"],
        "additionalProperties": false,
    })
}
