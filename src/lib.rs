//! Scrapes public content pages into a normalized feed of posts, without official APIs.
//!
//! [`client::SkraperClient`] fetches bytes, html documents and json;
//! [`provider::Skraper`] implementations turn a page into [`model::Post`]s.

pub mod client;
pub mod config;
pub mod conformance;
pub mod model;
pub mod provider;

pub use client::{DefaultSkraperClient, SkraperClient};
pub use model::{Attachment, AttachmentType, ImageSize, Post};
pub use provider::{ProviderKind, Registry, Skraper};
