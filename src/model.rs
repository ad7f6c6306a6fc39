use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// One normalized feed item.
///
/// `publish_timestamp` is in milliseconds since the unix epoch and is
/// usually derived from relative dates, so it is approximate.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub publish_timestamp: Option<i64>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttachmentType {
    Image,
    Video,
    Audio,
}

/// A media reference of a [`Post`]. `aspect_ratio` is width / height and always positive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: AttachmentType,
    pub aspect_ratio: f64,
}

impl Attachment {
    /// Builds an attachment, falling back to `default_ratio` if `aspect_ratio` is not a positive finite number.
    pub fn new(url: impl Into<String>, kind: AttachmentType, aspect_ratio: Option<f64>, default_ratio: f64) -> Self {
        let aspect_ratio = aspect_ratio
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(default_ratio);

        Attachment { url: url.into(), kind, aspect_ratio }
    }
}

/// Width / height of reported media dimensions, `None` if either is zero.
pub fn ratio_of(width: u64, height: u64) -> Option<f64> {
    if width == 0 || height == 0 {
        None
    } else {
        Some(width as f64 / height as f64)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Error)]
#[error("Unknown {kind} '{value}', expected one of: {expected}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl FromStr for ImageSize {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(ImageSize::Small),
            "medium" => Ok(ImageSize::Medium),
            "large" => Ok(ImageSize::Large),
            _ => Err(UnknownVariant { kind: "image size", value: s.to_owned(), expected: "small, medium, large" }),
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageSize::Small => "small",
            ImageSize::Medium => "medium",
            ImageSize::Large => "large",
        };

        f.write_str(name)
    }
}
