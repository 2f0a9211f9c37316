//! Core domain types: orders, envelopes, and trigger events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// An order as delivered by the ERP feed.
///
/// The whole JSON object is kept in source key order. `status`, `valor` and
/// `frete` must be present; `desconto` may be absent. Amounts stay raw JSON so
/// that numeric text is parsed (and rejected) by the transformer, not by serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct RawOrder {
    fields: Map<String, Value>,
}

static NULL: Value = Value::Null;

impl RawOrder {
    /// ERP status label (`finished`, `in progress`, ...).
    pub fn status(&self) -> &str {
        self.fields
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Encoded discount: `"10%"`, `"R$10,50"`, `10`, or `null` when absent.
    pub fn desconto(&self) -> &Value {
        self.fields.get("desconto").unwrap_or(&NULL)
    }

    /// Order value as delivered.
    pub fn valor(&self) -> &Value {
        self.fields.get("valor").unwrap_or(&NULL)
    }

    /// Shipping cost as delivered.
    pub fn frete(&self) -> &Value {
        self.fields.get("frete").unwrap_or(&NULL)
    }

    /// Every field of the order, in source order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for RawOrder {
    type Error = PipelineError;

    fn try_from(fields: Map<String, Value>) -> Result<Self> {
        match fields.get("status") {
            Some(Value::String(_)) => {}
            Some(other) => {
                return Err(PipelineError::parse(format!(
                    "status must be a string, got {other}"
                )));
            }
            None => return Err(PipelineError::parse("missing field `status`")),
        }
        for field in ["valor", "frete"] {
            if !fields.contains_key(field) {
                return Err(PipelineError::parse(format!("missing field `{field}`")));
            }
        }
        Ok(Self { fields })
    }
}

impl From<RawOrder> for Map<String, Value> {
    fn from(order: RawOrder) -> Self {
        order.fields
    }
}

/// Normalized order status as exposed to the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Concluido,
    Aberto,
    Cancelado,
    Outro,
}

impl OrderStatus {
    /// The CRM label for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concluido => "concluido",
            Self::Aberto => "aberto",
            Self::Cancelado => "cancelado",
            Self::Outro => "outro",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order after status normalization and discount resolution.
///
/// Serializes as the raw order with `status` and `desconto` replaced in
/// place and `valor_final` appended. All other fields, `valor` and `frete`
/// included, keep their raw JSON values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct TransformedOrder {
    fields: Map<String, Value>,
    status: OrderStatus,
    desconto: f64,
    valor_final: f64,
}

impl TransformedOrder {
    /// Build from a raw order. `desconto` is `None` when the order carries
    /// no discount, which is written as `0`.
    pub fn new(
        raw: &RawOrder,
        status: OrderStatus,
        desconto: Option<f64>,
        valor_final: f64,
    ) -> Self {
        let mut fields = raw.fields.clone();
        fields.insert("status".into(), Value::from(status.as_str()));
        fields.insert(
            "desconto".into(),
            desconto.map_or_else(|| Value::from(0), Value::from),
        );
        fields.insert("valor_final".into(), Value::from(valor_final));

        Self {
            fields,
            status,
            desconto: desconto.unwrap_or(0.0),
            valor_final,
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Resolved discount amount.
    pub fn desconto(&self) -> f64 {
        self.desconto
    }

    /// `valor - desconto + frete`, rounded to cents.
    pub fn valor_final(&self) -> f64 {
        self.valor_final
    }

    /// Look up any field of the serialized order.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Every field, in serialization order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for TransformedOrder {
    type Error = PipelineError;

    fn try_from(fields: Map<String, Value>) -> Result<Self> {
        let status = fields
            .get("status")
            .cloned()
            .map(serde_json::from_value::<OrderStatus>)
            .transpose()?
            .ok_or_else(|| PipelineError::parse("missing field `status`"))?;
        let number = |field: &str| {
            fields
                .get(field)
                .and_then(Value::as_f64)
                .ok_or_else(|| PipelineError::parse(format!("`{field}` must be a number")))
        };
        let desconto = number("desconto")?;
        let valor_final = number("valor_final")?;

        Ok(Self {
            fields,
            status,
            desconto,
            valor_final,
        })
    }
}

impl From<TransformedOrder> for Map<String, Value> {
    fn from(order: TransformedOrder) -> Self {
        order.fields
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Bucket name and object key of a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub name: String,
    pub key: String,
}

/// The document written by one transform run.
///
/// Wire shape: `{"Records": {"s3": {"bucket": {"name", "key"}, "objects": [...]}}}`.
/// The merge stage reads it back as `Envelope<Value>` so objects are copied
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = TransformedOrder> {
    #[serde(rename = "Records")]
    pub records: EnvelopeRecords<T>,
}

/// `Records` member of an [`Envelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeRecords<T> {
    pub s3: EnvelopeBody<T>,
}

/// Provenance plus the order batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeBody<T> {
    pub bucket: ObjectLocation,
    pub objects: Vec<T>,
}

impl<T> Envelope<T> {
    /// Wrap a batch with the location it will be written to.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, objects: Vec<T>) -> Self {
        Self {
            records: EnvelopeRecords {
                s3: EnvelopeBody {
                    bucket: ObjectLocation {
                        name: bucket.into(),
                        key: key.into(),
                    },
                    objects,
                },
            },
        }
    }

    /// Where this envelope was written.
    pub fn location(&self) -> &ObjectLocation {
        &self.records.s3.bucket
    }

    /// The order batch.
    pub fn objects(&self) -> &[T] {
        &self.records.s3.objects
    }

    /// Consume the envelope, returning the order batch.
    pub fn into_objects(self) -> Vec<T> {
        self.records.s3.objects
    }
}

// ---------------------------------------------------------------------------
// Trigger event
// ---------------------------------------------------------------------------

/// Object-created notification naming an envelope to merge.
///
/// Wire shape: `{"Records": [{"s3": {"bucket": {"name"}, "object": {"key"}}}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub s3: EventEntity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEntity {
    pub bucket: EventBucket,
    pub object: EventObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBucket {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventObject {
    pub key: String,
}

impl S3Event {
    /// Build a single-record event for `(bucket, key)`.
    pub fn single(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            records: vec![EventRecord {
                s3: EventEntity {
                    bucket: EventBucket { name: bucket.into() },
                    object: EventObject { key: key.into() },
                },
            }],
        }
    }

    /// Bucket and key of the first record. Further records are ignored.
    pub fn location(&self) -> Result<ObjectLocation> {
        let record = self
            .records
            .first()
            .ok_or_else(|| PipelineError::not_found("event contains no records"))?;
        Ok(ObjectLocation {
            name: record.s3.bucket.name.clone(),
            key: record.s3.object.key.clone(),
        })
    }
}
