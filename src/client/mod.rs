mod reqwest_client;

pub use reqwest_client::{ClientSettings, DefaultSkraperClient};

use async_trait::async_trait;
use image::ImageReader;
use scraper::Html;
use serde_json::Value;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response status {0}")]
    Status(reqwest::StatusCode),

    #[error("Response body is empty")]
    EmptyBody,

    #[error("Malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unable to read image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unable to guess image format: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image has a zero dimension ({width}x{height})")]
    ZeroSizedImage { width: u32, height: u32 },
}

/// Retrieves pages over the network.
///
/// Every fetch either yields a value or `None`; network failures, non-success
/// statuses and malformed payloads never surface as errors to the caller.
/// Implementations only provide [`SkraperClient::fetch_bytes`], the other
/// fetch modes decode its output.
#[async_trait]
pub trait SkraperClient: Send + Sync {
    /// GET `url`, following redirects. `None` on failure or an empty body.
    async fn fetch_bytes(&self, url: &str) -> Option<Vec<u8>>;

    async fn fetch_document(&self, url: &str) -> Option<Html> {
        let bytes = self.fetch_bytes(url).await?;
        Some(parse_document(&bytes))
    }

    async fn fetch_json(&self, url: &str) -> Option<Value> {
        let bytes = self.fetch_bytes(url).await?;

        match parse_json(&bytes) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::debug!("discarding response of {url}: {e}");
                None
            },
        }
    }

    /// Width / height of the image at `url`. `None` if it cannot be fetched or decoded.
    async fn fetch_aspect_ratio(&self, url: &str) -> Option<f64> {
        let bytes = self.fetch_bytes(url).await?;

        match aspect_ratio(&bytes) {
            Ok(ratio) => Some(ratio),
            Err(e) => {
                tracing::debug!("no aspect ratio for {url}: {e}");
                None
            },
        }
    }
}

pub fn parse_document(bytes: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(bytes))
}

pub fn parse_json(bytes: &[u8]) -> Result<Value, FetchError> {
    serde_json::from_slice(bytes).map_err(Into::into)
}

/// Reads only the image header to compute width / height.
pub fn aspect_ratio(bytes: &[u8]) -> Result<f64, FetchError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;

    if width == 0 || height == 0 {
        return Err(FetchError::ZeroSizedImage { width, height });
    }

    Ok(f64::from(width) / f64::from(height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use scraper::Selector;
    use std::collections::HashMap;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    struct MapClient(HashMap<&'static str, Vec<u8>>);

    #[async_trait]
    impl SkraperClient for MapClient {
        async fn fetch_bytes(&self, url: &str) -> Option<Vec<u8>> {
            self.0.get(url).cloned()
        }
    }

    #[test]
    fn aspect_ratio_from_png_header() {
        let ratio = aspect_ratio(&png(200, 300)).unwrap();
        assert!((ratio - 200.0 / 300.0).abs() <= 0.01);
    }

    #[test]
    fn aspect_ratio_rejects_garbage() {
        assert!(aspect_ratio(b"definitely not an image").is_err());
    }

    #[test]
    fn tolerant_document_parsing() {
        let html = parse_document(b"<p>unclosed <b>markup");
        let selector = Selector::parse("b").unwrap();
        let text: String = html.select(&selector).next().unwrap().text().collect();
        assert_eq!(text, "markup");
    }

    #[tokio::test]
    async fn provided_fetch_modes() {
        let client = MapClient(HashMap::from([
            ("json", br#"[{"owner": {"login": "someone"}}]"#.to_vec()),
            ("broken-json", b"{ nope".to_vec()),
            ("image", png(40, 20)),
            ("page", b"<html><body><p>hi</p></body></html>".to_vec()),
        ]));

        let json = client.fetch_json("json").await.unwrap();
        assert_eq!(json[0]["owner"]["login"], "someone");
        assert!(client.fetch_json("broken-json").await.is_none());
        assert!(client.fetch_json("missing").await.is_none());

        assert_eq!(client.fetch_aspect_ratio("image").await, Some(2.0));
        assert!(client.fetch_aspect_ratio("page").await.is_none());
        assert!(client.fetch_aspect_ratio("missing").await.is_none());

        assert!(client.fetch_document("page").await.is_some());
        assert!(client.fetch_document("missing").await.is_none());
    }
}
