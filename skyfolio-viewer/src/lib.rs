//! # Skyfolio Viewer
//!
//! Headless display logic for the portfolio client. Nothing here draws
//! pixels; each piece is a state machine that tells a renderer which frame to
//! show and which network work to start.
//!
//! - [`display`]: the per-cell staged loader (skeleton, thumbnail, full)
//! - [`cell`]: an async driver that runs a cell against an [`ImageFetcher`]
//! - [`pagination`] and [`gallery`]: bounded grid rendering with load-more
//! - [`visibility`]: edge-triggered, one-shot viewport tracking
//! - [`zoom`]: the full-screen zoom/pan viewer

pub mod cell;
pub mod config;
pub mod display;
pub mod error;
pub mod fetch;
pub mod gallery;
pub mod pagination;
pub mod visibility;
pub mod zoom;

pub use cell::{CellInput, run_cell};
pub use config::DisplayConfig;
pub use display::{DisplayEvent, Effect, LoadStage, ProgressiveImage, RenderFrame, Tier};
pub use error::{FetchError, Result};
pub use fetch::{FetchedImage, HttpImageFetcher, ImageFetcher};
pub use gallery::Gallery;
pub use pagination::PaginatedGrid;
pub use visibility::{GridLayout, Rect, ViewportTracker};
pub use zoom::{LoadCompletion, ViewerFrame, ViewerKey, ViewerTicket, ZoomViewer};
