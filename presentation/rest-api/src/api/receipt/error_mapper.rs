use poem::http::StatusCode;
use poem_openapi::payload::Json;

use business::domain::receipt::errors::BatchError;

use crate::api::error::{ErrorResponse, IntoErrorResponse};
use crate::api::receipt::dto::ImageDecodeError;

impl IntoErrorResponse for BatchError {
    fn into_error_response(self) -> (StatusCode, Json<ErrorResponse>) {
        let message = self.to_string();
        let name = match &self {
            BatchError::TooManyImages { .. } => "BatchTooLarge",
        };

        (StatusCode::BAD_REQUEST, ErrorResponse::json(name, &message))
    }
}

impl IntoErrorResponse for ImageDecodeError {
    fn into_error_response(self) -> (StatusCode, Json<ErrorResponse>) {
        (
            StatusCode::BAD_REQUEST,
            ErrorResponse::json("ValidationError", &self.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_oversized_batches() {
        let (status, json) = BatchError::TooManyImages { count: 30, max: 20 }.into_error_response();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json.0.name, "BatchTooLarge");
        assert_eq!(json.0.message, "batch.too_many_images");
    }

    #[test]
    fn should_map_invalid_base64_to_bad_request() {
        let (status, json) = ImageDecodeError::InvalidBase64 { index: 0 }.into_error_response();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json.0.message, "receipt.invalid_base64");
    }
}
