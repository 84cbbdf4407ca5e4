use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
        Multipart, Path, Query, State,
    },
    http::{HeaderMap, Method, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::{authenticate, detail, ApiError, Db, Photo};

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct PhotoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// `{"<field>": ["<message>"]}`, the shape the real API uses for bad input.
fn field_error(field: &str, message: &str) -> ApiError {
    let mut body = serde_json::Map::new();
    body.insert(field.to_string(), json!([message]));
    (StatusCode::BAD_REQUEST, Json(Value::Object(body)))
}

fn not_found() -> ApiError {
    detail(StatusCode::NOT_FOUND, "Not found.")
}

fn forbidden() -> ApiError {
    detail(StatusCode::FORBIDDEN, "You do not have permission to perform this action.")
}

/// Ids that are not UUIDs name no photo.
fn photo_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id).map_err(|_| not_found())
}

/// Any method a photo route does not serve, PUT included.
pub async fn method_not_allowed(method: Method) -> ApiError {
    detail(StatusCode::METHOD_NOT_ALLOWED, &format!("Method \"{method}\" not allowed."))
}

/// Newest first; `?limit=n` keeps the first `n`.
pub async fn list_photos(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<Vec<Photo>> {
    let store = db.read().await;
    let newest_first = store.photos.iter().rev().cloned();
    Json(match params.limit {
        Some(limit) => newest_first.take(limit).collect(),
        None => newest_first.collect(),
    })
}

pub async fn create_photo(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Photo>), ApiError> {
    let author = authenticate(&*db.read().await, &headers)?;
    let Ok(mut multipart) = multipart else {
        return Err(field_error("image", "No file was submitted."));
    };

    let mut image: Option<(String, usize)> = None;
    let mut title = None;
    let mut description = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| detail(StatusCode::BAD_REQUEST, &e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| detail(StatusCode::BAD_REQUEST, &e.body_text()))?;
                image = Some((filename, bytes.len()));
            }
            "title" | "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| detail(StatusCode::BAD_REQUEST, &e.body_text()))?;
                if name == "title" {
                    title = Some(text);
                } else {
                    description = Some(text);
                }
            }
            _ => {}
        }
    }

    let Some((filename, image_size)) = image.filter(|(_, size)| *size > 0) else {
        return Err(field_error("image", "No file was submitted."));
    };
    let Some(title) = title.filter(|t| !t.is_empty()) else {
        return Err(field_error("title", "This field is required."));
    };

    let mut store = db.write().await;
    if store.photos.iter().any(|p| p.title == title) {
        return Err(field_error("title", "photo with this title already exists."));
    }
    let ext = filename.rsplit('.').next().unwrap_or("bin");
    let photo = Photo {
        id: Uuid::new_v4(),
        author,
        image: format!("/media/photos/{title}.{ext}"),
        title,
        description,
        image_size,
    };
    store.photos.push(photo.clone());
    info!(id = %photo.id, title = %photo.title, "photo uploaded");
    Ok((StatusCode::CREATED, Json(photo)))
}

pub async fn get_photo(
    State(db): State<Db>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Photo>, ApiError> {
    let id = photo_id(path)?;
    let store = db.read().await;
    store.photos.iter().find(|p| p.id == id).cloned().map(Json).ok_or_else(not_found)
}

pub async fn update_photo(
    State(db): State<Db>,
    path: Result<Path<Uuid>, PathRejection>,
    headers: HeaderMap,
    input: Result<Json<PhotoPatch>, JsonRejection>,
) -> Result<Json<Photo>, ApiError> {
    let id = photo_id(path)?;
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let Json(input) = input.map_err(|e| detail(StatusCode::BAD_REQUEST, &e.body_text()))?;

    if let Some(title) = &input.title {
        if store.photos.iter().any(|p| p.id != id && &p.title == title) {
            return Err(field_error("title", "photo with this title already exists."));
        }
    }
    let photo = store.photos.iter_mut().find(|p| p.id == id).ok_or_else(not_found)?;
    if photo.author != user {
        return Err(forbidden());
    }
    if let Some(title) = input.title {
        photo.title = title;
    }
    if let Some(description) = input.description {
        photo.description = Some(description);
    }
    Ok(Json(photo.clone()))
}

/// 204 with an empty body on success.
pub async fn delete_photo(
    State(db): State<Db>,
    path: Result<Path<Uuid>, PathRejection>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let id = photo_id(path)?;
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let index = store.photos.iter().position(|p| p.id == id).ok_or_else(not_found)?;
    if store.photos[index].author != user {
        return Err(forbidden());
    }
    store.photos.remove(index);
    Ok(StatusCode::NO_CONTENT)
}
