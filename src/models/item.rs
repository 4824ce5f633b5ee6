use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::Price;
use crate::error::{AppError, Result};

/// Stock level below which a low-stock notification is sent.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub item_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: Price,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity < LOW_STOCK_THRESHOLD
    }
}

/// Fields accepted by create, already coerced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: Price,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl NewItem {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self> {
        let quantity = body.get("quantity").and_then(coerce_quantity).unwrap_or(0);

        let price = match body.get("price") {
            None | Some(Value::Null) => Price::ZERO,
            Some(value) => Price::from_json(value)
                .ok_or_else(|| AppError::Validation("price must be a decimal number".to_string()))?,
        };

        Ok(Self {
            name: text_field(body, "name")?.flatten(),
            description: text_field(body, "description")?.flatten(),
            quantity,
            price,
            category: text_field(body, "category")?.flatten(),
            image_url: text_field(body, "imageUrl")?.flatten(),
        })
    }

    pub fn into_item(self, item_id: String, now: DateTime<Utc>) -> InventoryItem {
        InventoryItem {
            item_id,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            price: self.price,
            category: self.category,
            image_url: self.image_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Merge-patch for an existing record.
///
/// The outer `Option` is presence in the request; for text fields the inner
/// `Option` distinguishes a new value from an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub quantity: Option<i64>,
    pub price: Option<Price>,
    pub category: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
}

/// A single attribute assignment produced by a patch.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Text(Option<String>),
    Integer(i64),
    Decimal(Price),
}

impl ItemPatch {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self> {
        let quantity = body
            .get("quantity")
            .map(|value| {
                coerce_quantity(value).ok_or_else(|| {
                    AppError::Validation("quantity must be a non-negative integer".to_string())
                })
            })
            .transpose()?;

        let price = body
            .get("price")
            .map(|value| {
                Price::from_json(value)
                    .ok_or_else(|| AppError::Validation("price must be a decimal number".to_string()))
            })
            .transpose()?;

        Ok(Self {
            name: text_field(body, "name")?,
            description: text_field(body, "description")?,
            quantity,
            price,
            category: text_field(body, "category")?,
            image_url: text_field(body, "imageUrl")?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }

    /// Present fields as `(attribute, value)` pairs in a stable order.
    pub fn assignments(&self) -> Vec<(&'static str, PatchValue)> {
        let mut out = Vec::new();

        if let Some(name) = &self.name {
            out.push(("name", PatchValue::Text(name.clone())));
        }
        if let Some(description) = &self.description {
            out.push(("description", PatchValue::Text(description.clone())));
        }
        if let Some(quantity) = self.quantity {
            out.push(("quantity", PatchValue::Integer(quantity)));
        }
        if let Some(price) = self.price {
            out.push(("price", PatchValue::Decimal(price)));
        }
        if let Some(category) = &self.category {
            out.push(("category", PatchValue::Text(category.clone())));
        }
        if let Some(image_url) = &self.image_url {
            out.push(("imageUrl", PatchValue::Text(image_url.clone())));
        }

        out
    }

    pub fn apply(&self, item: &mut InventoryItem, updated_at: DateTime<Utc>) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(image_url) = &self.image_url {
            item.image_url = image_url.clone();
        }
        item.updated_at = updated_at;
    }
}

/// Parses a request body into a JSON object. An empty body is `{}`.
pub fn parse_body(bytes: &[u8]) -> Result<Map<String, Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Validation(
            "Request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(AppError::Validation(format!("Invalid JSON body: {}", e))),
    }
}

pub fn required_item_id(value: Option<&Value>) -> Result<String> {
    match value {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        _ => Err(AppError::Validation("itemId is required".to_string())),
    }
}

/// Integer coercion for stock counts. Floats truncate; negatives are rejected.
pub fn coerce_quantity(value: &Value) -> Option<i64> {
    let quantity = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;

    (quantity >= 0).then_some(quantity)
}

fn text_field(body: &Map<String, Value>, key: &str) -> Result<Option<Option<String>>> {
    match body.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(AppError::Validation(format!("{} must be a string", key))),
    }
}
