use actix_web::http::header::{self, ContentType};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use actix_web_flash_messages::FlashMessage;

use crate::inference::InferenceError;
use crate::report::ReportError;
use crate::storage::UploadError;
use crate::views;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Uploaded image not found: {0}")]
    ImageNotFound(String),
    #[error("Request body exceeds the {0} byte limit")]
    PayloadTooLarge(usize),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("Classification failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("Report generation failed: {0}")]
    Report(#[from] ReportError),
    #[error("Malformed upload: {0}")]
    Multipart(#[from] actix_multipart::MultipartError),
    #[error("Blocking task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl AppError {
    /// Message the user sees. Server faults never expose internal details.
    fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => {
                "The request could not be processed. Please try again later.".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn is_flash(&self) -> bool {
        match self {
            AppError::Validation(_) => true,
            AppError::Upload(e) => e.is_user_error(),
            _ => false,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            _ if self.is_flash() => StatusCode::FOUND,
            AppError::BadRequest(_) | AppError::Multipart(_) => StatusCode::BAD_REQUEST,
            AppError::ImageNotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if self.is_flash() {
            log::warn!("Rejected upload: {}", self);
            FlashMessage::error(self.to_string()).send();
            return HttpResponse::build(status)
                .insert_header((header::LOCATION, "/"))
                .finish();
        }

        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }
        HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(views::error_page(status.as_u16(), &self.public_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_kind() {
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ImageNotFound("x.png".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::PayloadTooLarge(16).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::Upload(UploadError::InvalidFileType).status_code(),
            StatusCode::FOUND
        );
        assert_eq!(
            AppError::Inference(InferenceError::NonFiniteOutput).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_faults_hide_details() {
        let error = AppError::Inference(InferenceError::ModelError("tensor shape mismatch".into()));
        assert!(!error.public_message().contains("tensor"));
        let error = AppError::BadRequest("confidence must be a number".into());
        assert_eq!(error.public_message(), "Invalid request: confidence must be a number");
    }
}
