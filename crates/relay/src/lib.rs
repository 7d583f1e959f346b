//! Webhook ingestion service for security alerts.
//!
//! This crate provides:
//! - Defensive extraction of alert fields from untyped webhook payloads
//! - Asset lookup-or-create against a hosted record store
//! - Alert record assembly linked to the resolved asset
//! - A cancellable retention purge for stale, unresolved alerts
//! - The HTTP server wiring for the webhook endpoint

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod alerts;
pub mod assets;
pub mod config;
pub mod error;
pub mod payload;
pub mod purge;
pub mod server;
pub mod store;
pub mod timestamp;

pub use alerts::AlertWriter;
pub use assets::AssetResolver;
pub use config::Config;
pub use error::{IngestError, StoreError};
pub use payload::AlertEvent;
pub use store::StoreClient;
