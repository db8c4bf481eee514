pub mod image_validation;
pub mod public_dir;
pub mod thumbnail;
