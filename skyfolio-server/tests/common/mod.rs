#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
    routing::get,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::Value;
use skyfolio_server::{
    AppState, create_app,
    infra::config::{
        Config, ConfigMetadata, CorsConfig, FetchConfig, ServerConfig,
        StorageConfig, UploadConfig,
    },
};
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;

pub struct TestApp {
    pub root: TempDir,
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_upload_limit(8 * 1024 * 1024)
    }

    pub fn with_upload_limit(max_upload_bytes: usize) -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 3000,
                public_base_url: Some(
                    Url::parse("http://localhost:3000").expect("base url"),
                ),
            },
            storage: StorageConfig {
                thumbnail_dir: root.path().join("public/thumbnails"),
                upload_dir: root.path().join("public/uploads"),
                temp_dir: Some(root.path().join("tmp")),
            },
            uploads: UploadConfig { max_upload_bytes },
            fetch: FetchConfig {
                timeout: Duration::from_secs(5),
            },
            cors: CorsConfig::default(),
            metadata: ConfigMetadata::default(),
        };
        std::fs::create_dir_all(root.path().join("tmp")).expect("tmp dir");
        let state = AppState::new(config).expect("app state");
        let router = create_app(state.clone());
        Self {
            root,
            router,
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).expect("request"))
            .await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(Request::delete(uri).body(Body::empty()).expect("request"))
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        query: &str,
    ) -> Response<Body> {
        self.send(
            Request::post(format!("/api/v1/uploads{query}"))
                .header(header::CONTENT_TYPE, content_type)
                .header("x-filename", "coastline.png")
                .body(Body::from(bytes))
                .expect("request"),
        )
        .await
    }

    pub fn thumbnail_count(&self) -> usize {
        count_entries(&self.root.path().join("public/thumbnails"))
    }

    pub fn upload_count(&self) -> usize {
        count_entries(&self.root.path().join("public/uploads"))
    }
}

fn count_entries(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn png(w: u32, h: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([(x % 200) as u8, (y % 200) as u8, 150])
    }));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

/// Serves `/photo.png` (800x600) and `/page.html`; everything else is 404.
pub async fn spawn_source_server() -> SocketAddr {
    let photo = png(800, 600);
    let app = Router::new()
        .route(
            "/photo.png",
            get(move || {
                let photo = photo.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], photo) }
            }),
        )
        .route(
            "/page.html",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<p>hi</p>") }),
        )
        .fallback(|| async { StatusCode::NOT_FOUND });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind source server");
    let addr = listener.local_addr().expect("source addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("source server");
    });
    addr
}
