use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use request_logger::HandlerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid param: {0}")]
    InvalidParam(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidParam(_) => {
                let message = self.to_string();
                (
                    StatusCode::BAD_REQUEST,
                    HandlerError::public(message.clone()),
                    message,
                )
                    .into_response()
            }
            // Details stay in the logs
            Error::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                HandlerError::private(self.to_string()),
                "Internal server error",
            )
                .into_response(),
        }
    }
}
