#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, RgbImage};
use skyfolio_model::{MediaRecord, MediaType};
use skyfolio_viewer::{FetchError, FetchedImage, ImageFetcher};

pub fn png(w: u32, h: u32) -> Bytes {
    let img = DynamicImage::ImageRgb8(RgbImage::new(w, h));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    Bytes::from(out.into_inner())
}

pub fn fetched(url: &str, w: u32, h: u32) -> FetchedImage {
    FetchedImage {
        url: url.to_string(),
        bytes: Bytes::from_static(b"encoded"),
        width: w,
        height: h,
    }
}

/// Answers each URL after a fixed delay; unknown URLs never answer.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: HashMap<String, (Duration, Result<FetchedImage, FetchError>)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, url: &str, delay: Duration) -> Self {
        self.routes
            .insert(url.to_string(), (delay, Ok(fetched(url, 100, 100))));
        self
    }

    pub fn fail(mut self, url: &str, delay: Duration, status: u16) -> Self {
        self.routes.insert(
            url.to_string(),
            (
                delay,
                Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                }),
            ),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ImageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        self.calls.lock().expect("calls lock").push(url.to_string());
        match self.routes.get(url).cloned() {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => std::future::pending().await,
        }
    }
}

pub fn records(photos: usize, videos: usize) -> Vec<MediaRecord> {
    let photos = (0..photos).map(|i| {
        MediaRecord::new(
            format!("Photo {i}"),
            MediaType::Photo,
            format!("http://cdn/uploads/p{i}.jpg"),
        )
        .with_thumbnail(Some(format!("http://cdn/thumbnails/p{i}.jpg")))
    });
    let videos = (0..videos).map(|i| {
        MediaRecord::new(
            format!("Clip {i}"),
            MediaType::Video,
            format!("http://cdn/uploads/v{i}.mp4"),
        )
    });
    photos.chain(videos).collect()
}
