use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sea_orm::DbErr;

/// Failures of catalog operations.
///
/// `InvalidRating` and `DuplicateTitle` are raised before the store is
/// touched. `Store` carries whatever the database layer reported.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("rating must be between 0 and 10, got {0}")]
    InvalidRating(f64),
    #[error("movie '{0}' already exists")]
    DuplicateTitle(String),
    #[error(transparent)]
    Store(#[from] DbErr),
}

impl CatalogError {
    /// True for errors the user caused and can correct.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CatalogError::InvalidRating(_) | CatalogError::DuplicateTitle(_))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        let body = crate::templates::error_page(self.to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
