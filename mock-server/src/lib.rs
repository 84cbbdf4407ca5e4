//! In-memory stand-in for the photo-sharing API the request tester talks to.
//!
//! Routes mirror the real backend: token issue and refresh under
//! `/api/auth/`, and photo CRUD under `/api/photos/` with multipart upload.
//! Errors are JSON `{"detail": ...}` objects, the way the real API answers.

mod auth;
mod photos;

use std::{collections::HashMap, sync::Arc};

use axum::{
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use auth::{TokenPair, TokenRequest};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Photo {
    pub id: Uuid,
    pub author: String,
    pub title: String,
    pub description: Option<String>,
    /// Public URL of the stored image.
    pub image: String,
    pub image_size: usize,
}

#[derive(Default)]
pub struct Store {
    /// username -> password, registered on first login.
    users: HashMap<String, String>,
    /// access token -> username.
    access: HashMap<String, String>,
    /// refresh token -> username.
    refresh: HashMap<String, String>,
    /// Oldest first.
    photos: Vec<Photo>,
}

pub type Db = Arc<RwLock<Store>>;

/// A JSON error reply.
pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn detail(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "detail": message })))
}

/// Username behind the request's `Authorization: Bearer` header.
pub(crate) fn authenticate(store: &Store, headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let Some(token) = header.strip_prefix("Bearer ") else {
        return Err(detail(StatusCode::UNAUTHORIZED, "Authentication credentials were not provided."));
    };
    store
        .access
        .get(token)
        .cloned()
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Given token not valid for any token type"))
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/auth/token/", post(auth::obtain_token))
        .route("/api/auth/token/refresh/", post(auth::refresh_token))
        .route(
            "/api/photos/",
            get(photos::list_photos)
                .post(photos::create_photo)
                .fallback(photos::method_not_allowed),
        )
        .route(
            "/api/photos/{id}/",
            get(photos::get_photo)
                .patch(photos::update_photo)
                .delete(photos::delete_photo)
                .fallback(photos::method_not_allowed),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
