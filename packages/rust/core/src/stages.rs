//! Stage entry points: ERP batch → envelope, envelope → CRM document.
//!
//! Each stage is one stateless call. Errors propagate with `?` to the stage
//! boundary, are logged once there, and become [`StageOutcome::Failure`].

use std::time::Instant;

use chrono::Local;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use orderbridge_shared::{Envelope, MergeConfig, Result, S3Event, TransformConfig};
use orderbridge_storage::BlobStore;

use crate::envelope::{decode_envelope, encode_envelope, envelope_key};
use crate::merge::{UPDATED_DOCUMENT_KEY, inject_orders};
use crate::outcome::StageOutcome;
use crate::sources::{load_raw_orders, load_template};
use crate::transform::transform_batch;

/// Confirmation returned by a successful transform.
pub const TRANSFORM_SUCCESS_MESSAGE: &str = "Dados processados e salvos no S3 com sucesso";

// ---------------------------------------------------------------------------
// Transform stage
// ---------------------------------------------------------------------------

/// Run the transform stage.
///
/// 1. Load the raw ERP batch
/// 2. Normalize statuses and transform every order
/// 3. Wrap the batch in an envelope under a timestamped key
/// 4. Write the envelope to `config.bucket`
///
/// Nothing is written unless every order transforms.
#[instrument(skip_all, fields(bucket = %config.bucket, source = %config.erp_data.display()))]
pub async fn run_transform(config: &TransformConfig, store: &dyn BlobStore) -> StageOutcome {
    let start = Instant::now();

    match transform_stage(config, store).await {
        Ok((key, count)) => {
            info!(
                key = %key,
                orders = count,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "envelope written"
            );
            StageOutcome::Success(Value::String(TRANSFORM_SUCCESS_MESSAGE.to_string()))
        }
        Err(e) => {
            error!(error = %e, "failed to process ERP data");
            StageOutcome::failure(e)
        }
    }
}

/// Returns the written key and the number of orders.
async fn transform_stage(
    config: &TransformConfig,
    store: &dyn BlobStore,
) -> Result<(String, usize)> {
    let raw = load_raw_orders(&config.erp_data).await?;
    debug!(orders = raw.len(), "raw batch loaded");

    let transformed = transform_batch(&raw)?;
    let count = transformed.len();

    let key = envelope_key(&Local::now(), config.unique_keys);
    let envelope = Envelope::new(config.bucket.as_str(), key.as_str(), transformed);
    let body = encode_envelope(&envelope)?;

    store.put(&config.bucket, &key, &body).await?;
    Ok((key, count))
}

// ---------------------------------------------------------------------------
// Merge stage
// ---------------------------------------------------------------------------

/// Run the merge stage for the envelope named by `event`.
///
/// 1. Load the CRM template from `config.crm_template`
/// 2. Read the envelope at the event's bucket and key
/// 3. Insert its orders into the template as `value0`, `value1`, ...
/// 4. Write the document to [`UPDATED_DOCUMENT_KEY`] in the same bucket
///
/// The destination key is fixed, so each run replaces the previous result.
/// On success the outcome carries the merged document.
#[instrument(skip_all, fields(template = %config.crm_template.display()))]
pub async fn run_merge(
    event: &S3Event,
    config: &MergeConfig,
    store: &dyn BlobStore,
) -> StageOutcome {
    let start = Instant::now();

    match merge_stage(event, config, store).await {
        Ok((document, inserted)) => {
            info!(
                key = UPDATED_DOCUMENT_KEY,
                orders = inserted,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "CRM document updated"
            );
            StageOutcome::Success(document)
        }
        Err(e) => {
            error!(error = %e, "failed to merge envelope");
            StageOutcome::failure(e)
        }
    }
}

/// Returns the merged document and the number of inserted orders.
async fn merge_stage(
    event: &S3Event,
    config: &MergeConfig,
    store: &dyn BlobStore,
) -> Result<(Value, usize)> {
    let mut document = load_template(&config.crm_template).await?;
    debug!("CRM template loaded");

    let location = event.location()?;
    info!(bucket = %location.name, key = %location.key, "merging envelope");

    let body = store.get(&location.name, &location.key).await?;
    let orders = decode_envelope(&body)?.into_objects();

    let keys = inject_orders(&mut document, orders)?;

    let encoded = serde_json::to_vec(&document)?;
    store
        .put(&location.name, UPDATED_DOCUMENT_KEY, &encoded)
        .await?;

    Ok((document, keys.len()))
}
