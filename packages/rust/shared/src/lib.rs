//! Shared types, error model, and configuration for orderbridge.
//!
//! This crate is the foundation depended on by all other orderbridge crates.
//! It provides:
//! - [`PipelineError`]: the unified error type
//! - Domain types ([`RawOrder`], [`TransformedOrder`], [`Envelope`], [`S3Event`])
//! - Configuration ([`AppConfig`], [`TransformConfig`], [`MergeConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, KeysConfig, MergeConfig, SourcesConfig, StorageBackend, StorageConfig,
    TransformConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_bucket,
};
pub use error::{PipelineError, Result};
pub use types::{
    Envelope, EnvelopeBody, EnvelopeRecords, EventBucket, EventEntity, EventObject, EventRecord,
    ObjectLocation, OrderStatus, RawOrder, S3Event, TransformedOrder,
};
