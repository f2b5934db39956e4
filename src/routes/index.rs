use axum::{Router, response::Html, routing::get};
use std::sync::Arc;

use crate::AppState;

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Exercise classifier</title>
  </head>
  <body>
    <h1>Exercise classifier</h1>
    <p>
      POST a JSON body <code>{"images": ["data:image/jpeg;base64,..."]}</code>
      to <code>/process_frame</code>.
    </p>
  </body>
</html>
"#;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}
