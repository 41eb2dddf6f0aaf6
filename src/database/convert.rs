//! Conversion between JSON documents and BSON.
//!
//! Outbound documents render `ObjectId` as a plain 24-hex string and dates as
//! RFC 3339, matching what the web client expects. Everything else goes
//! through relaxed extended JSON.

use mongodb::bson::{self, Bson};
use serde_json::Value;

use super::store::{Document, StoreError, StoreResult};

pub fn to_bson_document(doc: &Document) -> StoreResult<bson::Document> {
    bson::to_document(doc).map_err(|e| StoreError::Conversion(e.to_string()))
}

pub fn to_json_document(doc: bson::Document) -> Document {
    doc.into_iter().map(|(k, v)| (k, to_json_value(v))).collect()
}

pub fn to_json_value(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or(Value::Null),
        Bson::Document(doc) => Value::Object(to_json_document(doc)),
        Bson::Array(items) => Value::Array(items.into_iter().map(to_json_value).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// Identifier as the driver reported it, rendered the same way as `_id`
pub fn id_to_string(value: Bson) -> String {
    match to_json_value(value) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

pub fn to_json_documents(docs: Vec<bson::Document>) -> Vec<Document> {
    docs.into_iter().map(to_json_document).collect()
}
