mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::StatusCode, http::header, routing::get};
use skyfolio_viewer::{
    DisplayConfig, FetchError, HttpImageFetcher, ImageFetcher, ZoomViewer, zoom::load_full,
};

async fn spawn_server() -> SocketAddr {
    let photo = common::png(1600, 900);
    let app = Router::new()
        .route(
            "/full.png",
            get(move || {
                let photo = photo.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], photo) }
            }),
        )
        .route("/broken.png", get(|| async { "definitely not a png" }))
        .route(
            "/slow.png",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        )
        .fallback(|| async { StatusCode::NOT_FOUND });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

#[tokio::test]
async fn fetches_and_reads_dimensions() {
    let addr = spawn_server().await;
    let fetcher = HttpImageFetcher::from_config(&DisplayConfig::default()).expect("client");

    let image = fetcher
        .fetch(&format!("http://{addr}/full.png"))
        .await
        .expect("fetch");
    assert_eq!((image.width, image.height), (1600, 900));
    assert!(!image.bytes.is_empty());
}

#[tokio::test]
async fn maps_failures_to_fetch_errors() {
    let addr = spawn_server().await;
    let fetcher = HttpImageFetcher::new(Duration::from_millis(300)).expect("client");

    let missing = fetcher.fetch(&format!("http://{addr}/missing.png")).await;
    assert!(matches!(missing, Err(FetchError::Status { status: 404, .. })));

    let broken = fetcher.fetch(&format!("http://{addr}/broken.png")).await;
    assert!(matches!(broken, Err(FetchError::Decode { .. })));

    let slow = fetcher.fetch(&format!("http://{addr}/slow.png")).await;
    assert!(matches!(slow, Err(FetchError::Timeout { .. })));
}

#[tokio::test]
async fn viewer_fits_the_loaded_image() {
    let addr = spawn_server().await;
    let fetcher: Arc<dyn ImageFetcher> =
        Arc::new(HttpImageFetcher::from_config(&DisplayConfig::default()).expect("client"));

    let mut viewer = ZoomViewer::new(&DisplayConfig::default(), 800.0, 600.0);
    let ticket = viewer.open(format!("http://{addr}/full.png"), None);
    let completion = load_full(fetcher.as_ref(), ticket).await;

    assert!(viewer.complete(completion));
    assert_eq!(viewer.natural_size(), Some((1600, 900)));
    assert_eq!(viewer.baseline(), 0.5);
    assert_eq!(viewer.zoom_percent(), 100);
}
