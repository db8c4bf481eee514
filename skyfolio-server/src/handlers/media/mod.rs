pub mod handle_media;
pub mod handle_upload;
