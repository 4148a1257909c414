use std::borrow::Cow;

use rust_embed::RustEmbed;
use thiserror::Error;

/// Logical name of the brand mark drawn on the cover and page headers.
pub const BRAND_MARK: &str = "brand mark";

/// Embed the entire `assets/` directory into the binary.
#[derive(RustEmbed)]
#[folder = "assets"]
struct EmbeddedFiles;

/// A single image or asset that could not be obtained. Always recoverable:
/// the renderer skips the element and keeps laying out the page.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("failed to decode image: {0}")]
    Decode(String),
}

/// Lookup of static assets by logical name.
pub trait AssetStore {
    fn lookup(&self, name: &str) -> Result<Cow<'static, [u8]>, AssetError>;
}

/// Assets compiled into the binary from `assets/`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedAssets;

impl AssetStore for EmbeddedAssets {
    fn lookup(&self, name: &str) -> Result<Cow<'static, [u8]>, AssetError> {
        let path = asset_path(name);
        EmbeddedFiles::get(&path)
            .map(|file| file.data)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))
    }
}

/// Store with nothing in it.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssets;

impl AssetStore for NoAssets {
    fn lookup(&self, name: &str) -> Result<Cow<'static, [u8]>, AssetError> {
        Err(AssetError::NotFound(name.to_string()))
    }
}

/// Maps a logical name to a file under `assets/`.
/// `"brand mark"` becomes `brand_mark.png`; names with an extension pass through.
fn asset_path(name: &str) -> String {
    let trimmed = name.trim().trim_start_matches('/');
    let trimmed = trimmed.strip_prefix("assets/").unwrap_or(trimmed);
    if trimmed.contains('.') {
        trimmed.to_string()
    } else {
        format!("{}.png", trimmed.replace(' ', "_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_names_map_to_files() {
        assert_eq!(asset_path(BRAND_MARK), "brand_mark.png");
        assert_eq!(asset_path("/assets/brand_mark.png"), "brand_mark.png");
    }

    #[test]
    fn embedded_brand_mark_is_present() {
        let bytes = EmbeddedAssets.lookup(BRAND_MARK).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn unknown_asset_is_not_found() {
        assert_eq!(
            EmbeddedAssets.lookup("missing logo"),
            Err(AssetError::NotFound("missing logo".to_string()))
        );
        assert!(NoAssets.lookup(BRAND_MARK).is_err());
    }
}
