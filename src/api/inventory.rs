/// Item registration, listing, metadata and photo endpoints
use crate::{
    context::AppContext,
    error::{ServiceError, ServiceResult},
    service::Upload,
};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

/// Build inventory routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/register", post(register))
        .route("/inventory", get(list_items))
        .route("/inventory/:id", get(get_item))
        .route("/inventory/:id", put(update_item))
        .route("/inventory/:id", delete(delete_item))
        .route("/inventory/:id/photo", get(get_photo))
        .route("/inventory/:id/photo", put(put_photo))
}

/// JSON body for metadata updates; absent fields are retained
#[derive(Debug, Deserialize)]
struct UpdateItemRequest {
    inventory_name: Option<String>,
    description: Option<String>,
}

/// Fields extracted from a multipart form
#[derive(Default)]
struct MultipartFields {
    inventory_name: Option<String>,
    description: Option<String>,
    upload: Option<Upload>,
}

/// Drain a multipart body into its known fields
async fn read_multipart(mut multipart: Multipart) -> ServiceResult<MultipartFields> {
    let mut fields = MultipartFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("inventory_name") => {
                fields.inventory_name = Some(field.text().await.map_err(|e| {
                    ServiceError::Validation(format!("Invalid inventory_name field: {}", e))
                })?);
            }
            Some("description") => {
                fields.description = Some(field.text().await.map_err(|e| {
                    ServiceError::Validation(format!("Invalid description field: {}", e))
                })?);
            }
            Some("photo") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::Validation(format!("Invalid photo field: {}", e)))?;
                // A file input left empty submits a nameless, empty part
                if !filename.is_empty() {
                    fields.upload = Some(Upload {
                        filename,
                        data: data.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(fields)
}

/// POST /register (multipart: inventory_name, description, photo)
async fn register(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> ServiceResult<impl IntoResponse> {
    let fields = read_multipart(multipart).await?;

    let item = ctx
        .service
        .register(
            fields.inventory_name.as_deref(),
            fields.description.as_deref(),
            fields.upload,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /inventory
async fn list_items(State(ctx): State<AppContext>) -> ServiceResult<impl IntoResponse> {
    let items = ctx.service.list().await?;
    Ok(Json(items))
}

/// GET /inventory/:id
async fn get_item(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ServiceResult<impl IntoResponse> {
    let item = ctx.service.get(id).await?;
    Ok(Json(item))
}

/// PUT /inventory/:id (JSON: inventory_name?, description?)
async fn update_item(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateItemRequest>,
) -> ServiceResult<impl IntoResponse> {
    let item = ctx
        .service
        .update_metadata(id, body.inventory_name.as_deref(), body.description.as_deref())
        .await?;
    Ok(Json(item))
}

/// GET /inventory/:id/photo — binary stream
async fn get_photo(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ServiceResult<Response> {
    let (data, reference) = ctx.service.photo(id).await?;

    let mime = mime_guess::from_path(&reference).first_or_octet_stream();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, data.len().to_string())
        .body(axum::body::Body::from(data))
        .map_err(|e| ServiceError::Storage(format!("Failed to build response: {}", e)))?)
}

/// PUT /inventory/:id/photo (multipart: photo)
async fn put_photo(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ServiceResult<impl IntoResponse> {
    let fields = read_multipart(multipart).await?;
    let upload = fields
        .upload
        .ok_or_else(|| ServiceError::Validation("no photo".to_string()))?;

    let item = ctx.service.replace_photo(id, upload).await?;
    Ok(Json(item))
}

/// DELETE /inventory/:id
async fn delete_item(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ServiceResult<impl IntoResponse> {
    ctx.service.delete_item(id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}
