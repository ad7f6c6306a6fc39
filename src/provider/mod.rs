pub mod reddit;
mod time_ago;
pub mod util;
pub mod youtube;

pub use time_ago::parse_time_ago;
pub use util::uri_clean_up;

use crate::{
    client::SkraperClient,
    model::{ImageSize, Post, UnknownVariant},
};
use async_trait::async_trait;
use std::{fmt, str::FromStr, sync::Arc};
use url::Url;

/// Extracts a feed from one content source.
///
/// Unreachable pages and missing markup degrade to an empty feed or an absent
/// logo, never to an error.
#[async_trait]
pub trait Skraper: Send + Sync {
    fn base_url(&self) -> &str;

    fn client(&self) -> &Arc<dyn SkraperClient>;

    /// Whether `url` points into this provider's site.
    fn is_suitable(&self, url: &Url) -> bool {
        match (util::host_of(self.base_url()), url.host_str()) {
            (Some(base_host), Some(host)) => {
                let host = host.trim_start_matches("www.");
                host == base_host || host.ends_with(&format!(".{base_host}"))
            },
            _ => false,
        }
    }

    /// At most `limit` posts in page order.
    async fn get_latest_posts(&self, uri: &str, limit: usize) -> Vec<Post>;

    async fn get_page_logo_url(&self, uri: &str, image_size: ImageSize) -> Option<String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    #[cfg(feature = "youtube")]
    Youtube,
    #[cfg(feature = "reddit")]
    Reddit,
}

impl ProviderKind {
    pub const ALL: &'static [ProviderKind] = &[
        #[cfg(feature = "youtube")]
        ProviderKind::Youtube,
        #[cfg(feature = "reddit")]
        ProviderKind::Reddit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "youtube")]
            ProviderKind::Youtube => "youtube",
            #[cfg(feature = "reddit")]
            ProviderKind::Reddit => "reddit",
        }
    }

    pub fn create(self, client: Arc<dyn SkraperClient>) -> Box<dyn Skraper> {
        match self {
            #[cfg(feature = "youtube")]
            ProviderKind::Youtube => Box::new(youtube::YoutubeSkraper::new(client)),
            #[cfg(feature = "reddit")]
            ProviderKind::Reddit => Box::new(reddit::RedditSkraper::new(client)),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant { kind: "provider", value: s.to_owned(), expected: "youtube, reddit" })
    }
}

/// Explicit table of the available providers.
#[derive(Default)]
pub struct Registry {
    skrapers: Vec<(ProviderKind, Box<dyn Skraper>)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every compiled-in provider, all sharing `client`.
    pub fn with_defaults(client: Arc<dyn SkraperClient>) -> Self {
        let mut registry = Self::new();

        for &kind in ProviderKind::ALL {
            registry.register(kind, kind.create(Arc::clone(&client)));
        }

        registry
    }

    /// Registers `skraper` for `kind`, replacing a previous registration.
    pub fn register(&mut self, kind: ProviderKind, skraper: Box<dyn Skraper>) {
        self.skrapers.retain(|(k, _)| *k != kind);
        self.skrapers.push((kind, skraper));
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&dyn Skraper> {
        self.skrapers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, s)| s.as_ref())
    }

    pub fn find_for_url(&self, url: &Url) -> Option<(ProviderKind, &dyn Skraper)> {
        self.skrapers
            .iter()
            .find(|(_, s)| s.is_suitable(url))
            .map(|(k, s)| (*k, s.as_ref()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = ProviderKind> + '_ {
        self.skrapers.iter().map(|(k, _)| *k)
    }
}

#[cfg(all(test, feature = "youtube", feature = "reddit"))]
mod tests {
    use super::*;

    struct NoClient;

    #[async_trait]
    impl SkraperClient for NoClient {
        async fn fetch_bytes(&self, _url: &str) -> Option<Vec<u8>> {
            None
        }
    }

    fn registry() -> Registry {
        Registry::with_defaults(Arc::new(NoClient))
    }

    #[test]
    fn kinds_round_trip_through_names() {
        for &kind in ProviderKind::ALL {
            assert_eq!(kind.name().parse::<ProviderKind>().unwrap(), kind);
        }

        assert_eq!("YouTube".parse::<ProviderKind>().unwrap(), ProviderKind::Youtube);
        assert!("myspace".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn lookup_by_kind() {
        let registry = registry();

        assert_eq!(registry.kinds().collect::<Vec<_>>(), ProviderKind::ALL);
        assert_eq!(registry.get(ProviderKind::Reddit).unwrap().base_url(), "https://www.reddit.com");
    }

    #[test]
    fn lookup_by_url() {
        let registry = registry();

        let url = Url::parse("https://m.youtube.com/user/someone").unwrap();
        assert_eq!(registry.find_for_url(&url).map(|(k, _)| k), Some(ProviderKind::Youtube));

        let url = Url::parse("https://old.reddit.com/r/rust").unwrap();
        assert_eq!(registry.find_for_url(&url).map(|(k, _)| k), Some(ProviderKind::Reddit));

        let url = Url::parse("https://notyoutube.com/").unwrap();
        assert!(registry.find_for_url(&url).is_none());
    }

    #[test]
    fn providers_share_the_injected_client() {
        let client: Arc<dyn SkraperClient> = Arc::new(NoClient);
        let registry = Registry::with_defaults(Arc::clone(&client));

        for kind in registry.kinds() {
            assert!(Arc::ptr_eq(registry.get(kind).unwrap().client(), &client), "{kind}");
        }
    }

    #[test]
    fn register_replaces() {
        let mut registry = registry();
        registry.register(ProviderKind::Youtube, ProviderKind::Youtube.create(Arc::new(NoClient)));

        assert_eq!(registry.kinds().count(), 2);
    }
}
