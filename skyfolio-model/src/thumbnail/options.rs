use super::OutputFormat;

pub const DEFAULT_QUALITY: u8 = 60;

/// Target box and encoding for one generated rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThumbnailOptions {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    /// 1..=100, JPEG only
    pub quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            width: 150,
            height: 150,
            format: OutputFormat::Jpeg,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl ThumbnailOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Returns a human readable reason when the options cannot be honoured.
    pub fn invalid_reason(&self) -> Option<String> {
        if self.width == 0 || self.height == 0 {
            return Some(format!(
                "target dimensions must be non-zero, got {}x{}",
                self.width, self.height
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Some(format!(
                "quality must be within 1..=100, got {}",
                self.quality
            ));
        }
        None
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}
