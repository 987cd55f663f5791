use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid params - {0}")]
    InvalidParams(String),

    #[error("Pin already exists - {0}")]
    PinAlreadyExists(String),

    #[error("Malformed message - {0}")]
    MalformedMessage(String),

    #[error("Unexpected message - {0}")]
    UnexpectedMessage(&'static str),

    #[error("Sender mismatch - expected {expected}, got {actual}")]
    SenderMismatch { expected: String, actual: String },

    #[error("Board is full")]
    RoomFull,

    #[error("Serialization error - {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error - {0}")]
    IoError(#[from] std::io::Error),

    #[error("TryInitError - {0}")]
    TryInitError(#[from] tracing_subscriber::util::TryInitError),
}

impl AppError {
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidParams(_) => -32602,
            Self::PinAlreadyExists(_) => -32037,
            Self::MalformedMessage(_) => -32700,
            Self::UnexpectedMessage(_) => -32600,
            Self::SenderMismatch { .. } => -32020,
            Self::RoomFull => -32081,
            Self::SerializationError(_) => -32072,
            Self::IoError(_) => -32080,
            Self::TryInitError(_) => -32080,
        }
    }

    pub fn user_safe_format(&self) -> ErrorBody {
        match self {
            Self::InvalidParams(msg) => ErrorBody {
                code: self.code(),
                message: msg.clone(),
            },
            Self::SerializationError(error) => {
                tracing::error!(error = %error, "Serialization error");

                ErrorBody {
                    code: self.code(),
                    message: "Internal server error".to_string(),
                }
            }
            Self::IoError(error) => {
                tracing::error!(error = %error, "IO error");

                ErrorBody {
                    code: self.code(),
                    message: "Service temporarily unavailable. Please try again later.".to_string(),
                }
            }
            Self::TryInitError(error) => {
                tracing::error!(error = %error, "TryInitError");

                ErrorBody {
                    code: self.code(),
                    message: "Internal server error".to_string(),
                }
            }
            Self::RoomFull => ErrorBody {
                code: self.code(),
                message: "The board has reached its client limit. Try again later.".to_string(),
            },
            _ => ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidParams(_) | Self::MalformedMessage(_) | Self::UnexpectedMessage(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PinAlreadyExists(_) => StatusCode::CONFLICT,
            Self::SenderMismatch { .. } => StatusCode::FORBIDDEN,
            Self::RoomFull => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let json_error = self.user_safe_format();
        let body = serde_json::to_string(&json_error)
            .unwrap_or_else(|_| r#"{"code":-32603,"message":"Internal server error"}"#.to_string());

        (status, [("content-type", "application/json")], body).into_response()
    }
}
