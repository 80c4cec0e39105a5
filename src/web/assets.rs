use axum::{
    body::Body,
    extract::Path,
    http::{header, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};
use rust_embed::RustEmbed;

/// The UI is a single static page, embedded at build time.
#[derive(RustEmbed)]
#[folder = "static/"]
pub struct Assets;

pub async fn index_handler() -> impl IntoResponse {
    serve_asset("index.html")
}

pub async fn static_handler(Path(path): Path<String>) -> impl IntoResponse {
    serve_asset(path.trim_start_matches('/'))
}

fn serve_asset(path: &str) -> Response<Body> {
    let Some(asset) = Assets::get(path) else {
        return Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("404 Not Found"))
            .unwrap();
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Response::builder()
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_str(mime.as_ref()).unwrap(),
        )
        .body(Body::from(asset.data.into_owned()))
        .unwrap()
}
