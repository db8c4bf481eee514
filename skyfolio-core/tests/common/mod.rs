#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, head};
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, RgbImage};
use skyfolio_core::{GeneratorConfig, ThumbnailGenerator};
use tempfile::TempDir;
use url::Url;

pub struct GeneratorFixture {
    pub root: TempDir,
    pub generator: ThumbnailGenerator,
}

impl GeneratorFixture {
    pub fn new() -> Self {
        Self::with_base(Url::parse("http://localhost:3000").expect("base url"))
    }

    pub fn with_base(base: Url) -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let scratch = root.path().join("tmp");
        std::fs::create_dir_all(&scratch).expect("scratch dir");
        let config = GeneratorConfig::new(root.path().join("thumbnails"), base)
            .with_temp_dir(scratch);
        let generator = ThumbnailGenerator::new(config).expect("generator");
        Self { root, generator }
    }

    pub fn thumbnail_dir(&self) -> PathBuf {
        self.root.path().join("thumbnails")
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.root.path().join("tmp")
    }

    pub fn temp_entries(&self) -> usize {
        std::fs::read_dir(self.temp_dir())
            .map(|d| d.count())
            .unwrap_or(0)
    }

    pub fn thumbnail_entries(&self) -> usize {
        std::fs::read_dir(self.thumbnail_dir())
            .map(|d| d.count())
            .unwrap_or(0)
    }
}

pub fn encoded_image(w: u32, h: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([(x % 251) as u8, (y % 241) as u8, 96])
    }));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("encode fixture image");
    out.into_inner()
}

/// In-process HTTP server with fixed routes:
/// `/photo.png` (640x480 PNG), `/garbage.png` (image content type, non-image
/// body), `/page.html` (text/html), anything else 404.
pub async fn spawn_fixture_server() -> SocketAddr {
    let photo = Bytes::from(encoded_image(640, 480, ImageFormat::Png));
    let app = Router::new()
        .route(
            "/photo.png",
            get(move || {
                let photo = photo.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], photo) }
            }),
        )
        .route(
            "/garbage.png",
            get(|| async {
                ([(header::CONTENT_TYPE, "image/png")], "this is not a png")
            }),
        )
        .route(
            "/page.html",
            get(|| async {
                ([(header::CONTENT_TYPE, "text/html")], "<html></html>")
            }),
        )
        .fallback(|| async { StatusCode::NOT_FOUND.into_response() });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture server");
    let addr = listener.local_addr().expect("fixture addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fixture server");
    });
    addr
}

/// Requests seen by [`spawn_counting_server`], per method.
#[derive(Debug, Default)]
pub struct MethodCounts {
    get: AtomicUsize,
    head: AtomicUsize,
}

impl MethodCounts {
    pub fn gets(&self) -> usize {
        self.get.load(Ordering::SeqCst)
    }

    pub fn heads(&self) -> usize {
        self.head.load(Ordering::SeqCst)
    }
}

/// Serves `/head-only.png`: HEAD answers 200 with an image content type,
/// GET answers 500. Every request is counted.
pub async fn spawn_counting_server() -> (SocketAddr, Arc<MethodCounts>) {
    let counts = Arc::new(MethodCounts::default());
    let on_get = Arc::clone(&counts);
    let on_head = Arc::clone(&counts);
    let app = Router::new().route(
        "/head-only.png",
        head(move || {
            on_head.head.fetch_add(1, Ordering::SeqCst);
            async { ([(header::CONTENT_TYPE, "image/png")], StatusCode::OK) }
        })
        .get(move || {
            on_get.get.fetch_add(1, Ordering::SeqCst);
            async { StatusCode::INTERNAL_SERVER_ERROR }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind counting server");
    let addr = listener.local_addr().expect("counting addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("counting server");
    });
    (addr, counts)
}
