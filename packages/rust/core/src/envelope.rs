//! Envelope keys and encoding.

use chrono::{DateTime, TimeZone};
use orderbridge_shared::{Envelope, Result, TransformedOrder};
use serde_json::Value;
use uuid::Uuid;

/// Prefix of every generated envelope key.
pub const ENVELOPE_KEY_PREFIX: &str = "order_";

/// Timestamp layout inside envelope keys, e.g. `2024-06-05 00:15:31.390700`.
const KEY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Object key for an envelope written at `now`.
///
/// Keys have microsecond granularity, so two runs in the same microsecond
/// collide. With `unique` set a UUID v7 suffix is appended.
pub fn envelope_key<Tz>(now: &DateTime<Tz>, unique: bool) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let stamp = now.format(KEY_TIMESTAMP_FORMAT);
    if unique {
        format!("{ENVELOPE_KEY_PREFIX}{stamp}_{}.json", Uuid::now_v7())
    } else {
        format!("{ENVELOPE_KEY_PREFIX}{stamp}.json")
    }
}

/// Serialize an envelope for the blob store.
pub fn encode_envelope(envelope: &Envelope<TransformedOrder>) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(envelope)?)
}

/// Deserialize a stored envelope, keeping its objects as raw JSON.
pub fn decode_envelope(body: &[u8]) -> Result<Envelope<Value>> {
    Ok(serde_json::from_slice(body)?)
}
