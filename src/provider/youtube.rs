#![cfg(feature = "youtube")]

use crate::{
    client::{DefaultSkraperClient, FetchError, SkraperClient},
    model::{Attachment, AttachmentType, ImageSize, Post},
    provider::{
        parse_time_ago,
        util::{selector, strip_host, uri_clean_up},
        Skraper,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};
use std::sync::Arc;

const BASE_URL: &str = "https://www.youtube.com";
const HOSTS: [&str; 3] = ["www.youtube.com", "m.youtube.com", "youtube.com"];
const DEFAULT_VIDEO_ASPECT_RATIO: f64 = 210.0 / 117.5;

/// Scrapes the video listing of a channel or user page.
pub struct YoutubeSkraper {
    client: Arc<dyn SkraperClient>,
}

impl YoutubeSkraper {
    pub fn new(client: Arc<dyn SkraperClient>) -> Self {
        YoutubeSkraper { client }
    }

    pub fn with_default_client() -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(DefaultSkraperClient::new()?)))
    }

    /// `uri` may be `user/name`, `channel/id`, with or without `/videos`, or a full url.
    pub fn user_page_url(uri: &str) -> String {
        let cleaned = uri_clean_up(uri);
        let path = strip_host(&cleaned, &HOSTS);

        if path.ends_with("/videos") || path == "videos" {
            format!("{BASE_URL}/{path}?gl=EN&hl=en")
        } else {
            format!("{BASE_URL}/{path}/videos?gl=EN&hl=en")
        }
    }

    async fn get_user_page(&self, uri: &str) -> Option<Html> {
        let url = Self::user_page_url(uri);
        let document = self.client.fetch_document(&url).await;

        if document.is_none() {
            tracing::debug!("youtube page {url} is unavailable");
        }

        document
    }

    pub fn parse_posts(document: &Html, limit: usize, now: DateTime<Utc>) -> Vec<Post> {
        let video_selector = selector(".yt-lockup-video");
        let link_selector = selector(".yt-uix-tile-link");

        document
            .select(&video_selector)
            .take(limit)
            .map(|video| {
                let link = video.select(&link_selector).next();
                let href = link.and_then(|l| l.value().attr("href")).unwrap_or_default();

                Post {
                    id: parse_id(href),
                    caption: link
                        .and_then(|l| l.value().attr("title"))
                        .unwrap_or_default()
                        .to_owned(),
                    publish_timestamp: parse_publish_date(video, now),
                    attachments: vec![Attachment {
                        url: format!("{BASE_URL}{href}"),
                        kind: AttachmentType::Video,
                        aspect_ratio: DEFAULT_VIDEO_ASPECT_RATIO,
                    }],
                }
            })
            .collect()
    }

    pub fn parse_logo_url(document: &Html) -> Option<String> {
        let logo_selector = selector(r#"[rel="image_src"]"#);

        document
            .select(&logo_selector)
            .next()
            .and_then(|e| e.value().attr("href"))
            .map(ToOwned::to_owned)
    }
}

fn parse_id(href: &str) -> String {
    let id = href.split_once("/watch?v=").map_or(href, |(_, id)| id);
    id.split('&').next().unwrap_or_default().to_owned()
}

fn parse_publish_date(video: ElementRef, now: DateTime<Utc>) -> Option<i64> {
    let meta_selector = selector(".yt-lockup-meta-info");
    let li_selector = selector("li");

    let text: String = video
        .select(&meta_selector)
        .next()?
        .select(&li_selector)
        .nth(1)?
        .text()
        .collect();

    Some(parse_time_ago(&text, now).timestamp_millis())
}

#[async_trait]
impl Skraper for YoutubeSkraper {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    fn client(&self) -> &Arc<dyn SkraperClient> {
        &self.client
    }

    async fn get_latest_posts(&self, uri: &str, limit: usize) -> Vec<Post> {
        match self.get_user_page(uri).await {
            Some(document) => Self::parse_posts(&document, limit, Utc::now()),
            None => Vec::new(),
        }
    }

    async fn get_page_logo_url(&self, uri: &str, _image_size: ImageSize) -> Option<String> {
        let document = self.get_user_page(uri).await?;
        Self::parse_logo_url(&document)
    }
}
