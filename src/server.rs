/// HTTP server setup and routing
use crate::{
    context::AppContext,
    error::{ServiceError, ServiceResult},
};
use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(crate::api::routes())
        .with_state(ctx)
        .layer(middleware::map_response(normalize_method_not_allowed))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .fallback(method_not_allowed)
}

/// Fallback for any unmatched route
async fn method_not_allowed() -> impl IntoResponse {
    ServiceError::MethodNotAllowed
}

/// A wrong method on a matched path is answered by the method router with
/// an empty 405; give those responses the same JSON body as the fallback.
async fn normalize_method_not_allowed(response: Response) -> Response {
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        return ServiceError::MethodNotAllowed.into_response();
    }
    response
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> ServiceResult<()> {
    let addr = format!("{}:{}", ctx.config.host, ctx.config.port);

    info!("Server running at http://{}", addr);

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
