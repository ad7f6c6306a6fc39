#![cfg(feature = "reddit")]

use crate::{
    client::{DefaultSkraperClient, FetchError, SkraperClient},
    model::{ratio_of, Attachment, AttachmentType, ImageSize, Post},
    provider::{
        util::{strip_host, unescape_url, uri_clean_up, url_path_ends_with_image_extension},
        Skraper,
    },
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

const BASE_URL: &str = "https://www.reddit.com";
const HOSTS: [&str; 4] = ["www.reddit.com", "old.reddit.com", "new.reddit.com", "reddit.com"];
const DEFAULT_ASPECT_RATIO: f64 = 1.0;
const MAX_LISTING_LIMIT: usize = 100;

fn dimensions(obj: &Value, width: &str, height: &str) -> Option<f64> {
    ratio_of(obj.get(width)?.as_u64()?, obj.get(height)?.as_u64()?)
}

fn str_at<'j>(json: &'j Value, pointer: &str) -> Option<&'j str> {
    json.pointer(pointer).and_then(Value::as_str)
}

/// Reads subreddit and user listings through reddit's public `.json` endpoints.
pub struct RedditSkraper {
    client: Arc<dyn SkraperClient>,
}

impl RedditSkraper {
    pub fn new(client: Arc<dyn SkraperClient>) -> Self {
        RedditSkraper { client }
    }

    pub fn with_default_client() -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(DefaultSkraperClient::new()?)))
    }

    /// `r/name`, `user/name`, `u/name`, a bare subreddit name or a full url.
    fn page_path(uri: &str) -> String {
        let cleaned = uri_clean_up(uri);
        let path = strip_host(&cleaned, &HOSTS);
        let path = path.split(['?', '#']).next().unwrap_or_default();

        let mut segments = path.split('/').filter(|s| !s.is_empty());

        match (segments.next(), segments.next()) {
            (Some("r"), Some(name)) => format!("r/{name}"),
            (Some("user" | "u"), Some(name)) => format!("user/{name}"),
            (Some(name), _) => format!("r/{name}"),
            (None, _) => String::new(),
        }
    }

    pub fn listing_url(uri: &str, limit: usize) -> String {
        let path = Self::page_path(uri);
        let listing = if path.starts_with("user/") { "submitted" } else { "hot" };
        let limit = limit.min(MAX_LISTING_LIMIT);

        format!("{BASE_URL}/{path}/{listing}.json?limit={limit}")
    }

    pub fn about_url(uri: &str) -> String {
        format!("{BASE_URL}/{path}/about.json", path = Self::page_path(uri))
    }

    pub fn parse_posts(json: &Value, limit: usize) -> Vec<Post> {
        let children = json
            .pointer("/data/children")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        children
            .iter()
            .filter_map(|child| match child.get("data") {
                Some(post) if post.is_object() => Some(Self::parse_post(post)),
                _ => {
                    tracing::warn!("skipping malformed reddit listing entry: {child}");
                    None
                },
            })
            .take(limit)
            .collect()
    }

    fn parse_post(post: &Value) -> Post {
        Post {
            id: str_at(post, "/id").unwrap_or_default().to_owned(),
            caption: str_at(post, "/title").unwrap_or_default().to_owned(),
            publish_timestamp: post
                .get("created_utc")
                .and_then(Value::as_f64)
                .map(|secs| (secs * 1000.0) as i64),
            attachments: Self::parse_attachments(post),
        }
    }

    fn parse_attachments(post: &Value) -> Vec<Attachment> {
        if let Some(video) = post.pointer("/secure_media/reddit_video") {
            if let Some(url) = str_at(video, "/fallback_url") {
                return vec![Attachment::new(
                    unescape_url(url),
                    AttachmentType::Video,
                    dimensions(video, "width", "height"),
                    DEFAULT_ASPECT_RATIO,
                )];
            }
        }

        if let Some(meta) = post.get("media_metadata").and_then(Value::as_object) {
            return Self::gallery_order(post, meta)
                .filter_map(|item| {
                    let source = item.get("s")?;
                    let url = str_at(source, "/u")?;

                    Some(Attachment::new(
                        unescape_url(url),
                        AttachmentType::Image,
                        dimensions(source, "x", "y"),
                        DEFAULT_ASPECT_RATIO,
                    ))
                })
                .collect();
        }

        let url = match str_at(post, "/url") {
            Some(url) => unescape_url(url),
            None => return Vec::new(),
        };

        if url_path_ends_with_image_extension(&url) {
            let ratio = post
                .pointer("/preview/images/0/source")
                .and_then(|source| dimensions(source, "width", "height"));

            vec![Attachment::new(url, AttachmentType::Image, ratio, DEFAULT_ASPECT_RATIO)]
        } else if url.ends_with(".gifv") {
            vec![Attachment::new(url, AttachmentType::Video, None, DEFAULT_ASPECT_RATIO)]
        } else {
            Vec::new()
        }
    }

    // media_metadata is keyed by media id, gallery_data holds the display order
    fn gallery_order<'j>(post: &'j Value, meta: &'j Map<String, Value>) -> Box<dyn Iterator<Item = &'j Value> + 'j> {
        match post.pointer("/gallery_data/items").and_then(Value::as_array) {
            Some(items) => Box::new(
                items
                    .iter()
                    .filter_map(|item| str_at(item, "/media_id"))
                    .filter_map(move |id| meta.get(id)),
            ),
            None => Box::new(meta.values()),
        }
    }

    pub fn parse_logo_url(json: &Value, image_size: ImageSize) -> Option<String> {
        let data = json.get("data").filter(|d| d.is_object())?;

        let keys = match image_size {
            ImageSize::Small => ["icon_img", "community_icon"],
            ImageSize::Medium | ImageSize::Large => ["community_icon", "icon_img"],
        };

        keys.iter()
            .filter_map(|key| data.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(unescape_url)
    }
}

#[async_trait]
impl Skraper for RedditSkraper {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    fn client(&self) -> &Arc<dyn SkraperClient> {
        &self.client
    }

    async fn get_latest_posts(&self, uri: &str, limit: usize) -> Vec<Post> {
        if limit == 0 {
            return Vec::new();
        }

        let url = Self::listing_url(uri, limit);

        match self.client.fetch_json(&url).await {
            Some(json) => Self::parse_posts(&json, limit),
            None => {
                tracing::debug!("reddit listing {url} is unavailable");
                Vec::new()
            },
        }
    }

    async fn get_page_logo_url(&self, uri: &str, image_size: ImageSize) -> Option<String> {
        let json = self.client.fetch_json(&Self::about_url(uri)).await?;
        Self::parse_logo_url(&json, image_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOT: &str = include_str!("../../test_data/reddit/hot.json");
    const ABOUT: &str = include_str!("../../test_data/reddit/about.json");

    #[test]
    fn post_without_url_has_no_attachments() {
        let post = serde_json::json!({ "id": "abc", "title": "t", "secure_media": null });
        assert!(RedditSkraper::parse_attachments(&post).is_empty());

        let post = serde_json::json!({ "id": "abc", "url": "https://i.imgur.com/x.gifv" });
        assert_eq!(
            RedditSkraper::parse_attachments(&post),
            vec![Attachment {
                url: "https://i.imgur.com/x.gifv".to_owned(),
                kind: AttachmentType::Video,
                aspect_ratio: DEFAULT_ASPECT_RATIO,
            }]
        );
    }

    #[test]
    fn default_client() {
        let skraper = RedditSkraper::with_default_client().unwrap();

        assert_eq!(skraper.base_url(), BASE_URL);
        assert!(skraper.is_suitable(&url::Url::parse("https://old.reddit.com/r/rust").unwrap()));
    }

    #[test]
    fn urls() {
        let expected = "https://www.reddit.com/r/rust/hot.json?limit=5";

        assert_eq!(RedditSkraper::listing_url("rust", 5), expected);
        assert_eq!(RedditSkraper::listing_url("r/rust/", 5), expected);
        assert_eq!(RedditSkraper::listing_url("https://old.reddit.com/r/rust/top/?t=day", 5), expected);
        assert_eq!(
            RedditSkraper::listing_url("u/someone", 500),
            "https://www.reddit.com/user/someone/submitted.json?limit=100"
        );
        assert_eq!(RedditSkraper::about_url("reddit.com/r/rust"), "https://www.reddit.com/r/rust/about.json");
    }

    #[test]
    fn listing() {
        let json: Value = serde_json::from_str(HOT).unwrap();
        let posts = RedditSkraper::parse_posts(&json, 10);

        let expected = vec![
            Post {
                id: "oi687m".to_owned(),
                caption: "A very rare Irrawaddy Dolphin".to_owned(),
                publish_timestamp: Some(1_626_000_000_000),
                attachments: vec![Attachment {
                    url: "https://i.redd.it/bsp1l1vynla71.jpg".to_owned(),
                    kind: AttachmentType::Image,
                    aspect_ratio: 1080.0 / 1350.0,
                }],
            },
            Post {
                id: "oi6lfk".to_owned(),
                caption: "Mama cat wants her kitten to be friends with human baby.".to_owned(),
                publish_timestamp: Some(1_626_000_100_500),
                attachments: vec![Attachment {
                    url: "https://v.redd.it/jx4ua6lirla71/DASH_1080.mp4?source=fallback".to_owned(),
                    kind: AttachmentType::Video,
                    aspect_ratio: 1920.0 / 1080.0,
                }],
            },
            Post {
                id: "ohvv5w".to_owned(),
                caption: "Lian li o11D XL".to_owned(),
                publish_timestamp: Some(1_626_000_200_000),
                attachments: vec![
                    Attachment {
                        url: "https://preview.redd.it/wrro81ytsha71.jpg?width=4000&format=pjpg&s=5f1a".to_owned(),
                        kind: AttachmentType::Image,
                        aspect_ratio: 4000.0 / 3000.0,
                    },
                    Attachment {
                        url: "https://preview.redd.it/nuwtn1ytsha71.jpg?width=3876&format=pjpg&s=7743".to_owned(),
                        kind: AttachmentType::Image,
                        aspect_ratio: DEFAULT_ASPECT_RATIO,
                    },
                ],
            },
            Post {
                id: String::new(),
                caption: "Text only".to_owned(),
                publish_timestamp: None,
                attachments: vec![],
            },
        ];

        assert_eq!(posts, expected);
    }

    #[test]
    fn limit_keeps_listing_order() {
        let json: Value = serde_json::from_str(HOT).unwrap();
        let ids: Vec<_> = RedditSkraper::parse_posts(&json, 2).into_iter().map(|p| p.id).collect();

        assert_eq!(ids, ["oi687m", "oi6lfk"]);
    }

    #[test]
    fn unexpected_json_is_empty() {
        assert!(RedditSkraper::parse_posts(&serde_json::json!({ "error": 404 }), 10).is_empty());
        assert!(RedditSkraper::parse_posts(&serde_json::json!([1, 2, 3]), 10).is_empty());
    }

    #[test]
    fn logo() {
        let json: Value = serde_json::from_str(ABOUT).unwrap();

        assert_eq!(
            RedditSkraper::parse_logo_url(&json, ImageSize::Large).as_deref(),
            Some("https://styles.redditmedia.com/t5_2s7lj/styles/communityIcon_5fuu.png?width=256&s=0a1b")
        );
        assert_eq!(
            RedditSkraper::parse_logo_url(&json, ImageSize::Small).as_deref(),
            Some("https://b.thumbs.redditmedia.com/icon.png")
        );
        assert_eq!(RedditSkraper::parse_logo_url(&serde_json::json!({}), ImageSize::Small), None);
    }
}
