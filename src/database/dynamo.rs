use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, error::DisplayErrorContext, types::AttributeValue};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use super::{RecordStore, StoreError};
use crate::models::{InventoryItem, ItemPatch, PatchValue, Price};

const KEY: &str = "itemId";

type Attributes = HashMap<String, AttributeValue>;

pub struct DynamoRecordStore {
    client: Client,
    table: String,
}

impl DynamoRecordStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn key(item_id: &str) -> AttributeValue {
        AttributeValue::S(item_id.to_string())
    }
}

fn sdk_error<E: std::error::Error + 'static>(action: &str, err: E) -> StoreError {
    tracing::error!("DynamoDB {} failed: {}", action, DisplayErrorContext(&err));
    StoreError(format!("{}", DisplayErrorContext(&err)))
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn get(&self, item_id: &str) -> Result<Option<InventoryItem>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY, Self::key(item_id))
            .send()
            .await
            .map_err(|e| sdk_error("GetItem", e))?;

        output.item.as_ref().map(from_attributes).transpose()
    }

    async fn put(&self, item: &InventoryItem) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_attributes(item)))
            .send()
            .await
            .map_err(|e| sdk_error("PutItem", e))?;

        Ok(())
    }

    async fn update(
        &self,
        item_id: &str,
        patch: &ItemPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let update = UpdateExpression::from_patch(patch, updated_at);

        let result = self
            .client
            .update_item()
            .table_name(&self.table)
            .key(KEY, Self::key(item_id))
            .update_expression(update.expression)
            .condition_expression(update.condition)
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                tracing::info!("Item {} no longer exists, update skipped", item_id);
                Ok(false)
            }
            Err(e) => Err(sdk_error("UpdateItem", e)),
        }
    }

    async fn delete(&self, item_id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key(KEY, Self::key(item_id))
            .send()
            .await
            .map_err(|e| sdk_error("DeleteItem", e))?;

        Ok(())
    }

    async fn scan(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let mut items = Vec::new();
        let mut start_key: Option<Attributes> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| sdk_error("Scan", e))?;

            for attributes in output.items.unwrap_or_default() {
                items.push(from_attributes(&attributes)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .describe_table()
            .table_name(&self.table)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeTable", e))?;

        Ok(())
    }
}

/// `SET` expression for a merge-patch: one placeholder pair per present
/// field, plus `updatedAt`. Guarded so it never creates a record.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub condition: String,
    pub names: HashMap<String, String>,
    pub values: Attributes,
}

impl UpdateExpression {
    pub fn from_patch(patch: &ItemPatch, updated_at: DateTime<Utc>) -> Self {
        let mut clauses = Vec::new();
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        let assignments = patch
            .assignments()
            .into_iter()
            .map(|(field, value)| (field, patch_value(value)))
            .chain(std::iter::once(("updatedAt", timestamp(updated_at))));

        for (field, value) in assignments {
            clauses.push(format!("#{field} = :{field}"));
            names.insert(format!("#{field}"), field.to_string());
            values.insert(format!(":{field}"), value);
        }
        names.insert(format!("#{KEY}"), KEY.to_string());

        Self {
            expression: format!("SET {}", clauses.join(", ")),
            condition: format!("attribute_exists(#{KEY})"),
            names,
            values,
        }
    }
}

fn patch_value(value: PatchValue) -> AttributeValue {
    match value {
        PatchValue::Text(text) => optional_text(text),
        PatchValue::Integer(n) => AttributeValue::N(n.to_string()),
        PatchValue::Decimal(price) => AttributeValue::N(price.to_string()),
    }
}

fn optional_text(text: Option<String>) -> AttributeValue {
    text.map_or(AttributeValue::Null(true), AttributeValue::S)
}

fn timestamp(at: DateTime<Utc>) -> AttributeValue {
    AttributeValue::S(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn to_attributes(item: &InventoryItem) -> Attributes {
    HashMap::from([
        (KEY.to_string(), AttributeValue::S(item.item_id.clone())),
        ("name".to_string(), optional_text(item.name.clone())),
        ("description".to_string(), optional_text(item.description.clone())),
        ("quantity".to_string(), AttributeValue::N(item.quantity.to_string())),
        ("price".to_string(), AttributeValue::N(item.price.to_string())),
        ("category".to_string(), optional_text(item.category.clone())),
        ("imageUrl".to_string(), optional_text(item.image_url.clone())),
        ("createdAt".to_string(), timestamp(item.created_at)),
        ("updatedAt".to_string(), timestamp(item.updated_at)),
    ])
}

fn from_attributes(attributes: &Attributes) -> Result<InventoryItem, StoreError> {
    let item_id = text(attributes, KEY)?
        .ok_or_else(|| StoreError("stored record has no itemId".to_string()))?;

    let malformed = |field: &str| StoreError(format!("record {} has malformed {}", item_id, field));

    let quantity = number(attributes, "quantity")
        .and_then(|n| n.parse::<i64>().ok())
        .ok_or_else(|| malformed("quantity"))?;

    let price = number(attributes, "price")
        .and_then(|n| n.parse::<Price>().ok())
        .ok_or_else(|| malformed("price"))?;

    let created_at = text(attributes, "createdAt")?
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or_else(|| malformed("createdAt"))?;

    let updated_at = text(attributes, "updatedAt")?
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or_else(|| malformed("updatedAt"))?;

    Ok(InventoryItem {
        name: text(attributes, "name")?,
        description: text(attributes, "description")?,
        quantity,
        price,
        category: text(attributes, "category")?,
        image_url: text(attributes, "imageUrl")?,
        created_at,
        updated_at,
        item_id,
    })
}

fn text(attributes: &Attributes, field: &str) -> Result<Option<String>, StoreError> {
    match attributes.get(field) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(AttributeValue::S(s)) => Ok(Some(s.clone())),
        Some(_) => Err(StoreError(format!("attribute {} is not a string", field))),
    }
}

/// Numeric text from an `N` attribute, or an `S` holding a number.
fn number<'a>(attributes: &'a Attributes, field: &str) -> Option<&'a str> {
    match attributes.get(field)? {
        AttributeValue::N(n) | AttributeValue::S(n) => Some(n.trim()),
        _ => None,
    }
}

/// RFC 3339, or the naive ISO-8601 form older records were written with.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
