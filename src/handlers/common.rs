use crate::errors::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

use crate::models::CatalogView;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))
}

/// Viewer selector for catalog reads. Defaults to the public storefront
/// view; `?view=privileged` exposes disabled items as well.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct ViewParams {
    #[serde(default)]
    pub view: Option<String>,
}

impl ViewParams {
    pub fn resolve(&self) -> Result<CatalogView, ServiceError> {
        match self.view.as_deref() {
            None | Some("public") => Ok(CatalogView::Public),
            Some("privileged") => Ok(CatalogView::Privileged),
            Some(other) => Err(ServiceError::InvalidInput(format!(
                "unknown view '{}': expected 'public' or 'privileged'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_param_resolution() {
        assert_eq!(
            ViewParams { view: None }.resolve().unwrap(),
            CatalogView::Public
        );
        assert_eq!(
            ViewParams {
                view: Some("privileged".into())
            }
            .resolve()
            .unwrap(),
            CatalogView::Privileged
        );
        assert!(ViewParams {
            view: Some("admin".into())
        }
        .resolve()
        .is_err());
    }
}
