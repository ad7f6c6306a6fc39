//! Behavioral checks every [`SkraperClient`] implementation has to pass.
//!
//! Each check is a plain async function so it can be driven from any test
//! harness. [`client_conformance_suite!`](crate::client_conformance_suite)
//! turns them into `#[tokio::test]` functions:
//!
//! ```rust,ignore
//! async fn setup() -> (MyClient, Fixtures, ()) {
//!     (MyClient::new(), Fixtures::public_internet(), ())
//! }
//!
//! skraper::client_conformance_suite!(setup);
//! ```

use crate::{client::SkraperClient, provider::util::selector};
use thiserror::Error;

pub const ASPECT_RATIO_TOLERANCE: f64 = 0.01;

/// Where the suite fetches from and what it expects to find there.
#[derive(Clone, Debug)]
pub struct Fixtures {
    /// Responds with a non-empty body.
    pub bytes_url: String,
    /// Redirects (possibly across schemes) to a non-empty body.
    pub redirect_url: String,
    /// Serves an html page.
    pub document_url: String,
    /// Serves a json array of objects with `owner.login`.
    pub json_url: String,
    /// Expected `owner.login` of the first element, compared case-insensitively.
    pub json_owner_login: String,
    pub image_url: String,
    pub image_aspect_ratio: f64,
    /// Cannot be resolved or connected to.
    pub unreachable_url: String,
}

impl Fixtures {
    pub fn public_internet() -> Self {
        Fixtures {
            bytes_url: "https://www.wikipedia.org/".to_owned(),
            redirect_url: "http://github.com/".to_owned(),
            document_url: "https://www.wikipedia.org/".to_owned(),
            json_url: "https://api.github.com/users/rust-lang/repos".to_owned(),
            json_owner_login: "rust-lang".to_owned(),
            image_url: "https://picsum.photos/200/300".to_owned(),
            image_aspect_ratio: 200.0 / 300.0,
            unreachable_url: "https://very-badurl.badurl".to_owned(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum Violation {
    #[error("{url} returned no bytes")]
    MissingBytes { url: String },

    #[error("{url} returned an empty body")]
    EmptyBytes { url: String },

    #[error("{url} returned no document")]
    MissingDocument { url: String },

    #[error("document of {url} has no body")]
    MissingBody { url: String },

    #[error("{url} returned no json")]
    MissingJson { url: String },

    #[error("json of {url} is not an array")]
    NotAnArray { url: String },

    #[error("json of {url} has owner login {found:?}, expected {expected:?}")]
    UnexpectedOwner { url: String, found: Option<String>, expected: String },

    #[error("{url} returned no aspect ratio")]
    MissingAspectRatio { url: String },

    #[error("aspect ratio of {url} is {found}, expected {expected}")]
    WrongAspectRatio { url: String, found: f64, expected: f64 },

    #[error("unreachable {url} returned {len} bytes")]
    UnreachableReturnedBytes { url: String, len: usize },
}

async fn non_empty_bytes(client: &dyn SkraperClient, url: &str) -> Result<(), Violation> {
    match client.fetch_bytes(url).await {
        None => Err(Violation::MissingBytes { url: url.to_owned() }),
        Some(bytes) if bytes.is_empty() => Err(Violation::EmptyBytes { url: url.to_owned() }),
        Some(_) => Ok(()),
    }
}

pub async fn fetch_bytes(client: &dyn SkraperClient, fixtures: &Fixtures) -> Result<(), Violation> {
    non_empty_bytes(client, &fixtures.bytes_url).await
}

pub async fn follows_redirects(client: &dyn SkraperClient, fixtures: &Fixtures) -> Result<(), Violation> {
    non_empty_bytes(client, &fixtures.redirect_url).await
}

pub async fn fetch_document(client: &dyn SkraperClient, fixtures: &Fixtures) -> Result<(), Violation> {
    let url = &fixtures.document_url;

    let document = client
        .fetch_document(url)
        .await
        .ok_or_else(|| Violation::MissingDocument { url: url.clone() })?;

    let body_selector = selector("body");

    match document.select(&body_selector).next() {
        Some(body) if body.parent().is_some() => Ok(()),
        _ => Err(Violation::MissingBody { url: url.clone() }),
    }
}

pub async fn fetch_json(client: &dyn SkraperClient, fixtures: &Fixtures) -> Result<(), Violation> {
    let url = &fixtures.json_url;

    let json = client
        .fetch_json(url)
        .await
        .ok_or_else(|| Violation::MissingJson { url: url.clone() })?;

    if !json.is_array() {
        return Err(Violation::NotAnArray { url: url.clone() });
    }

    let login = json[0]["owner"]["login"].as_str().map(str::to_lowercase);

    if login.as_deref() == Some(fixtures.json_owner_login.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(Violation::UnexpectedOwner { url: url.clone(), found: login, expected: fixtures.json_owner_login.clone() })
    }
}

pub async fn fetch_aspect_ratio(client: &dyn SkraperClient, fixtures: &Fixtures) -> Result<(), Violation> {
    let url = &fixtures.image_url;

    let found = client
        .fetch_aspect_ratio(url)
        .await
        .ok_or_else(|| Violation::MissingAspectRatio { url: url.clone() })?;

    if (found - fixtures.image_aspect_ratio).abs() <= ASPECT_RATIO_TOLERANCE {
        Ok(())
    } else {
        Err(Violation::WrongAspectRatio { url: url.clone(), found, expected: fixtures.image_aspect_ratio })
    }
}

pub async fn unreachable_is_absent(client: &dyn SkraperClient, fixtures: &Fixtures) -> Result<(), Violation> {
    let url = &fixtures.unreachable_url;

    match client.fetch_bytes(url).await {
        None => Ok(()),
        Some(bytes) => Err(Violation::UnreachableReturnedBytes { url: url.clone(), len: bytes.len() }),
    }
}

/// Runs every check in order, stopping at the first violation.
pub async fn run_all(client: &dyn SkraperClient, fixtures: &Fixtures) -> Result<(), Violation> {
    fetch_bytes(client, fixtures).await?;
    follows_redirects(client, fixtures).await?;
    fetch_document(client, fixtures).await?;
    fetch_json(client, fixtures).await?;
    fetch_aspect_ratio(client, fixtures).await?;
    unreachable_is_absent(client, fixtures).await
}

/// Expands to one `#[tokio::test]` per conformance check.
///
/// `$setup` is an async fn returning `(client, Fixtures, guard)`; the guard is
/// kept alive for the duration of the test (e.g. a mock server). Extra
/// attributes such as `#[ignore]` are applied to every generated test.
#[macro_export]
macro_rules! client_conformance_suite {
    (@one $setup:path, [$(#[$attr:meta])*], $check:ident) => {
        #[::tokio::test]
        $(#[$attr])*
        async fn $check() {
            let (client, fixtures, _guard) = $setup().await;

            if let Err(violation) = $crate::conformance::$check(&client, &fixtures).await {
                panic!("{violation}");
            }
        }
    };

    (@tests $setup:path, $attrs:tt, $($check:ident),+) => {
        $(
            $crate::client_conformance_suite!(@one $setup, $attrs, $check);
        )+
    };

    ($setup:path $(, #[$attr:meta])* $(,)?) => {
        $crate::client_conformance_suite!(@tests $setup, [$(#[$attr])*],
            fetch_bytes,
            follows_redirects,
            fetch_document,
            fetch_json,
            fetch_aspect_ratio,
            unreachable_is_absent
        );
    };
}
