use axum::response::Html;

static INDEX_HTML: &str = include_str!("../../static/index.html");

/// Upload page: file picker, result table and download button.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
