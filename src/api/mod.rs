/// API routes and handlers
pub mod forms;
pub mod inventory;
pub mod search;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(inventory::routes())
        .merge(search::routes())
        .merge(forms::routes())
}
