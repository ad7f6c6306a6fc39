use scraper::Selector;
use url::Url;

/// Strips leading schemes and slashes and trailing slashes, so that
/// `format!("{base_url}/{}", uri_clean_up(uri))` is a single well-formed url
/// whether `uri` is a bare path, a full url or has a trailing slash.
pub fn uri_clean_up(uri: &str) -> String {
    let mut s = uri.trim();

    loop {
        let stripped = strip_scheme(s).trim_start_matches('/');
        if stripped.len() == s.len() {
            break;
        }
        s = stripped;
    }

    s.trim_end_matches('/').to_owned()
}

fn strip_scheme(s: &str) -> &str {
    match s.split_once("://") {
        Some((scheme, rest))
            if !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            rest
        },
        _ => s,
    }
}

/// Drops the first matching `host/` prefix of an already cleaned up uri.
pub fn strip_host<'u>(cleaned: &'u str, hosts: &[&str]) -> &'u str {
    hosts
        .iter()
        .find_map(|host| {
            let rest = cleaned.strip_prefix(host)?;
            if rest.is_empty() {
                Some(rest)
            } else {
                rest.strip_prefix('/')
            }
        })
        .unwrap_or(cleaned)
}

pub fn host_of(base_url: &str) -> Option<String> {
    Url::parse(base_url).ok()?.host_str().map(|h| h.trim_start_matches("www.").to_owned())
}

pub fn url_path_ends_with_image_extension(haystack: &str) -> bool {
    const EXTENSIONS: [&str; 12] = [
        ".jpg", ".png", ".gif", ".tif", ".bmp", ".dib", ".jpeg", ".jpe", ".jfif", ".tiff", ".heic", ".webp",
    ];

    let Ok(url) = Url::parse(haystack) else {
        return false;
    };

    let s = url.path().trim_end_matches('/').to_ascii_lowercase();

    EXTENSIONS.iter().any(|x| s.ends_with(x))
}

pub fn unescape_url(url: &str) -> String {
    url.replace("&amp;", "&")
}

/// Selectors are compile-time constants, a parse failure is a programming error.
pub fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}
