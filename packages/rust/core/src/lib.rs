//! Order transformation pipeline for orderbridge.
//!
//! The two stages in [`stages`] tie the pure record rules ([`status`],
//! [`discount`], [`transform`], [`merge`]) to the blob store and the
//! externally provisioned source documents.

pub mod discount;
pub mod envelope;
pub mod merge;
pub mod outcome;
pub mod sources;
pub mod stages;
pub mod status;
pub mod transform;

pub use outcome::{StageOutcome, StageResponse};
pub use stages::{run_merge, run_transform};
