/// Item search endpoints
///
/// The GET and POST variants share the lookup but not the truthiness rule
/// for `includePhoto`: the HTML form posts checkbox state as the literal
/// "on", while the query parameter counts as set whenever it is present
/// and non-empty.
use crate::{context::AppContext, error::ServiceResult, service::SearchResult};
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;

/// Build search routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/search", get(search_query))
        .route("/search", post(search_form))
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    id: Option<i64>,
    #[serde(rename = "includePhoto")]
    include_photo: Option<String>,
}

/// GET /search?id=..&includePhoto=..
async fn search_query(
    State(ctx): State<AppContext>,
    Query(request): Query<SearchRequest>,
) -> ServiceResult<Json<SearchResult>> {
    let include = request
        .include_photo
        .as_deref()
        .is_some_and(|v| !v.is_empty());

    let result = ctx.service.search(request.id, include).await?;
    Ok(Json(result))
}

/// POST /search (urlencoded form: id, includePhoto)
async fn search_form(
    State(ctx): State<AppContext>,
    Form(request): Form<SearchRequest>,
) -> ServiceResult<Json<SearchResult>> {
    let include = request.include_photo.as_deref() == Some("on");

    let result = ctx.service.search(request.id, include).await?;
    Ok(Json(result))
}
