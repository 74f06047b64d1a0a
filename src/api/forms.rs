/// Static HTML form pages, embedded so the binary is self-contained
use crate::context::AppContext;
use axum::{response::Html, routing::get, Router};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/RegisterForm.html", get(register_form))
        .route("/SearchForm.html", get(search_form))
}

async fn register_form() -> Html<&'static str> {
    Html(include_str!("../../static/RegisterForm.html"))
}

async fn search_form() -> Html<&'static str> {
    Html(include_str!("../../static/SearchForm.html"))
}
