//! # vibe-hub
//!
//! Client for the myvibe hub API.
//!
//! - [`HubApi`]: the operations a publish run needs (upload, URL import,
//!   conversion stream and status, publish action, vibe lookup)
//! - [`HubClient`]: the `reqwest` implementation, with optional API-base
//!   discovery for hubs that mount the publisher under a sub-path
//! - [`TagCatalog`]: tag lists with a per-hub disk cache

pub mod api;
pub mod client;
pub mod discovery;
pub mod tags;
pub mod types;

mod error;
mod http;

pub use api::{ConversionStream, HubApi, HubSession, UploadFile};
pub use client::HubClient;
pub use discovery::ApiBaseResolver;
pub use error::HubError;
pub use tags::{TagCatalog, TagFetcher, TagsReport};
pub use types::{
    ActionResponse, ConversionEvent, ConversionStatus, FromUrlRequest, FromUrlResponse,
    ProcessingStatus, TagSet, TagType, UploadResponse, VibeInfo,
};
