//! # vibe-core
//!
//! Core types, validation, and shared collaborators for the myvibe publisher.
//!
//! This crate provides the foundational types shared across all vibe crates:
//! - Publish intent: raw [`PublishOptions`] and the validated [`PublishRequest`]
//! - Hub endpoint normalization ([`HubUrl`])
//! - Publish history entries and their storage key
//! - Terminal outcomes for conversion monitoring and whole publish runs
//! - Injectable [`Clock`] and [`Cache`] collaborators
//! - Atomic JSON file persistence helpers
//! - Cross-cutting error types

pub mod cache;
pub mod clock;
pub mod errors;
pub mod fsutil;
pub mod history;
pub mod hub;
pub mod outcome;
pub mod request;

pub use cache::{Cache, MemoryCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::CoreError;
pub use history::{HistoryEntry, history_key};
pub use hub::HubUrl;
pub use outcome::{ConversionOutcome, PublishOutcome};
pub use request::{
    PublishMetadata, PublishOptions, PublishRequest, Source, SourceKind, TagRef, Visibility,
};

/// Hub used when neither flags, publish file, nor application config name one.
pub const DEFAULT_HUB_URL: &str = "https://www.myvibe.so";
