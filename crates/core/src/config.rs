use crate::error::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use tracing::warn;
use url::Url;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// Everything the enhancement client needs, passed in explicitly.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub model_name: String,
    pub base_url: Url,
}

impl Config {
    /// Loads configuration from the process environment (and `.env`).
    ///
    /// A missing API key is not an error here; the service rejects the
    /// request and the failure surfaces as a transport error.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .unwrap_or_default();
        if api_key.is_empty() {
            warn!("GEMINI_API_KEY is not set; enhancement requests will be rejected");
        }

        let mut builder = Self::builder().with_api_key(api_key);
        if let Ok(model) = env::var("GEMINI_MODEL") {
            builder = builder.with_model(model);
        }
        if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
            builder = builder.with_base_url(base_url);
        }
        builder.build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Builder prefilled with this configuration, for overriding single
    /// fields without skipping validation.
    pub fn to_builder(&self) -> ConfigBuilder {
        ConfigBuilder {
            api_key: Some(self.api_key.clone()),
            model_name: Some(self.model_name.clone()),
            base_url: Some(self.base_url.to_string()),
        }
    }

    /// Model path segment, always of the form `models/<name>`.
    pub fn model_path(&self) -> String {
        if self.model_name.starts_with("models/") {
            self.model_name.clone()
        } else {
            format!("models/{}", self.model_name)
        }
    }
}

#[derive(Default)]
pub struct ConfigBuilder {
    api_key: Option<String>,
    model_name: Option<String>,
    base_url: Option<String>,
}

impl ConfigBuilder {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn build(self) -> Result<Config> {
        let model_name = self
            .model_name
            .map(|m| m.trim().to_string())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model_name.is_empty() || model_name == "models/" {
            return Err(AppError::config("Model name must not be empty"));
        }

        let mut raw_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        // Url::join drops the last segment unless the base ends with a slash
        if !raw_url.ends_with('/') {
            raw_url.push('/');
        }
        let base_url = Url::parse(&raw_url)
            .map_err(|e| AppError::config(format!("Invalid base URL '{}': {}", raw_url, e)))?;

        Ok(Config {
            api_key: self.api_key.unwrap_or_default(),
            model_name,
            base_url,
        })
    }
}
