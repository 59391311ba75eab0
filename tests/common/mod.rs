#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response},
};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use photoroll::{
    config::{RuntimeConfiguration, ServerConfig},
    routes::router,
    state::PhotoRollState,
};
use sqlx::sqlite::SqlitePoolOptions;
use std::{io::Cursor, path::Path};
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "photoroll-test-boundary";

pub struct TestApp {
    pub dir: TempDir,
    pub state: PhotoRollState,
    pub app: Router,
}

pub async fn start_in(dir: &Path) -> (PhotoRollState, Router) {
    let config = RuntimeConfiguration::from_server_config(ServerConfig::rooted_at(dir));
    let state = PhotoRollState::new(SqlitePoolOptions::new().max_connections(2), config)
        .await
        .unwrap();
    let app = router(state.clone());
    (state, app)
}

pub async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let (state, app) = start_in(dir.path()).await;
    TestApp { dir, state, app }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_multipart(&self, uri: &str, body: Vec<u8>) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub fn upload_path(&self, name: &str) -> std::path::PathBuf {
        self.state.images().path_of(name)
    }
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |_, _| Rgba([10u8, 200, 30, 255]));
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

pub fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, _| Rgba([if x % 2 == 0 { 255 } else { 0 }, 40, 40, 255]));
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Gif)
        .unwrap();
    out
}

///`text` parts are `(name, value)`, `file` is `(file name, bytes)` sent as the `photo` field
pub fn multipart_body(text: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in text {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
