pub mod handle_thumbnails;
