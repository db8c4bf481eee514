use super::models::Config;

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

/// Non-fatal findings collected while loading, logged once at startup.
#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.items.iter().any(|w| w.message.contains(needle))
    }
}

pub fn collect_warnings(config: &Config) -> ConfigWarnings {
    let mut warnings = ConfigWarnings::default();

    if config.server.public_base_url.is_none() {
        warnings.push_with_hint(
            "PUBLIC_BASE_URL not set; generated URLs are derived from the bind address",
            "Set PUBLIC_BASE_URL when the server sits behind a proxy or CDN",
        );
    }

    if config.cors.allowed_origins.is_empty() {
        warnings.push_with_hint(
            "CORS_ALLOWED_ORIGINS is empty; any origin may call the API",
            "List the gallery origin(s) in CORS_ALLOWED_ORIGINS",
        );
    }

    if config.cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push("CORS wildcard origin configured");
    }

    warnings
}
