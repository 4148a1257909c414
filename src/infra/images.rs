//! Blocking image download used while laying out product pages.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::util::assets::AssetError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Source of encoded image bytes for a product photo URL.
pub trait ImageSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError>;
}

/// Downloads images on the calling thread. One attempt per URL.
pub struct HttpImageSource {
    http: Client,
}

impl HttpImageSource {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent("Mozilla/5.0")
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let fetch_error = |reason: String| AssetError::Fetch {
            url: url.to_string(),
            reason,
        };

        debug!(url, "downloading product image");
        let response = self
            .http
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| fetch_error(err.to_string()))?;
        let bytes = response
            .bytes()
            .map_err(|err| fetch_error(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Never returns an image. Useful when photos should be left out.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoImages;

impl ImageSource for NoImages {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        Err(AssetError::NotFound(url.to_string()))
    }
}
