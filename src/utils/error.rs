use actix_web::{http::StatusCode, HttpResponse, ResponseError};

/// Everything a request can fail with. Each variant maps to one status code
/// and is rendered as the `{success, message}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid {0} ID")]
    InvalidId(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn is_server_error(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Internal(_))
    }

    /// Message shown to clients. Server-side failures are reported generically.
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            "Server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::MissingFields(_)
            | AppError::EmailTaken
            | AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = serde_json::json!({
            "success": false,
            "message": self.public_message(),
        });

        if let AppError::MissingFields(fields) = self {
            body["missingFields"] = serde_json::json!(fields);
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}
