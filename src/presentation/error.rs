// HTTP-facing error type
use crate::application::sheet_repository::SheetError;
use crate::domain::credentials::CredentialError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error(transparent)]
    Sheets(#[from] SheetError),
    #[error("please log in first")]
    Unauthenticated,
    #[error("page '{0}' not found")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("failed to render page: {0}")]
    Render(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Credentials(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Sheets(SheetError::Auth(_)) => StatusCode::UNAUTHORIZED,
            AppError::Sheets(SheetError::SpreadsheetNotFound(_) | SheetError::WorksheetNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Sheets(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<handlebars::RenderError> for AppError {
    fn from(e: handlebars::RenderError) -> Self {
        AppError::Render(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let missing = AppError::from(CredentialError::MissingFields(vec!["client_email".into()]));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.to_string(), "missing required fields: client_email");

        assert_eq!(
            AppError::from(SheetError::Auth("denied".into())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(SheetError::SpreadsheetNotFound("abc".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(SheetError::Request("timeout".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
    }
}
