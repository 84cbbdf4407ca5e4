use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::{detail, ApiError, Db};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: String,
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Issue an access/refresh pair. Unknown usernames are registered with the
/// given password on first use.
pub async fn obtain_token(State(db): State<Db>, Json(input): Json<TokenRequest>) -> Result<Json<TokenPair>, ApiError> {
    if input.username.is_empty() || input.password.is_empty() {
        return Err(detail(StatusCode::UNAUTHORIZED, "No active account found with the given credentials"));
    }
    let mut store = db.write().await;
    let password = store
        .users
        .entry(input.username.clone())
        .or_insert_with(|| input.password.clone());
    if *password != input.password {
        return Err(detail(StatusCode::UNAUTHORIZED, "No active account found with the given credentials"));
    }

    let pair = TokenPair {
        refresh: new_token(),
        access: new_token(),
    };
    store.access.insert(pair.access.clone(), input.username.clone());
    store.refresh.insert(pair.refresh.clone(), input.username.clone());
    info!(user = %input.username, "issued token pair");
    Ok(Json(pair))
}

pub async fn refresh_token(State(db): State<Db>, Json(input): Json<RefreshRequest>) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    let Some(user) = store.refresh.get(&input.refresh).cloned() else {
        return Err(detail(StatusCode::UNAUTHORIZED, "Token is invalid or expired"));
    };
    let access = new_token();
    store.access.insert(access.clone(), user);
    Ok(Json(json!({ "access": access })))
}
