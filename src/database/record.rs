//! Typed records checked at the HTTP boundary.
//!
//! The store is schema-less, so these types only guard what must hold before
//! a write: required fields are present and well-typed. Fields the client
//! sends beyond the known ones are carried through untouched.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::store::Document;

/// Errors raised while turning request JSON into a record
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Request body must be a JSON object")]
    NotAnObject,
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
    #[error("No fields to update")]
    EmptyUpdate,
}

/// A price exactly as the client sent it: a JSON number or a numeric string.
/// The value is checked on the way in and persisted untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Price(Value);

impl Price {
    /// Numeric reading of the price, if it has one
    pub fn amount(&self) -> Option<f64> {
        match &self.0 {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let price = Price(Value::deserialize(deserializer)?);
        match price.amount() {
            Some(amount) if amount.is_finite() && amount >= 0.0 => Ok(price),
            _ => Err(de::Error::custom(format!(
                "price {} is not a non-negative number",
                price.0
            ))),
        }
    }
}

/// A food listing contributed by a signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

/// Fields to set on an existing (or upserted) food listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Document,
}

/// A cart line: a denormalised copy of a food plus the owning user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(flatten)]
    pub food: Document,
}

impl FoodItem {
    pub fn from_json(value: Value) -> Result<Self, RecordError> {
        let item: Self = parse_object(value)?;
        require_non_empty("name", &item.name)?;
        if let Some(email) = &item.user_email {
            require_non_empty("userEmail", email)?;
        }
        Ok(item)
    }

    pub fn into_document(self) -> Result<Document, RecordError> {
        to_document(&self)
    }
}

impl FoodUpdate {
    pub fn from_json(value: Value) -> Result<Self, RecordError> {
        let update: Self = parse_object(value)?;
        if let Some(name) = &update.name {
            require_non_empty("name", name)?;
        }
        if let Some(email) = &update.user_email {
            require_non_empty("userEmail", email)?;
        }
        Ok(update)
    }

    /// The `$set` fields. An update that sets nothing is rejected.
    pub fn into_document(self) -> Result<Document, RecordError> {
        let doc = to_document(&self)?;
        if doc.is_empty() {
            return Err(RecordError::EmptyUpdate);
        }
        Ok(doc)
    }
}

impl CartEntry {
    pub fn from_json(value: Value) -> Result<Self, RecordError> {
        let entry: Self = parse_object(value)?;
        require_non_empty("userEmail", &entry.user_email)?;
        Ok(entry)
    }

    pub fn into_document(self) -> Result<Document, RecordError> {
        to_document(&self)
    }
}

/// Deserialize an object, dropping any client-supplied `_id`.
/// Identifiers are assigned by the store and never rewritten.
fn parse_object<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T, RecordError> {
    let Value::Object(mut map) = value else {
        return Err(RecordError::NotAnObject);
    };
    map.remove("_id");

    serde_json::from_value(Value::Object(map)).map_err(|e| RecordError::InvalidField {
        field: "document".to_string(),
        reason: e.to_string(),
    })
}

fn to_document<T: Serialize>(record: &T) -> Result<Document, RecordError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(RecordError::NotAnObject),
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), RecordError> {
    if value.trim().is_empty() {
        return Err(RecordError::InvalidField {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}
