use serde::Serialize;

use super::InventoryItem;

#[derive(Debug, Serialize)]
pub struct ItemMessage {
    pub message: &'static str,
    pub item: InventoryItem,
}

#[derive(Debug, Serialize)]
pub struct ItemLookup {
    pub item: InventoryItem,
}

#[derive(Debug, Serialize)]
pub struct ItemList {
    pub items: Vec<InventoryItem>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
    pub item_id: Option<String>,
}

impl ItemQuery {
    /// The selected id, treating an empty value as absent.
    pub fn selected(&self) -> Option<&str> {
        self.item_id.as_deref().filter(|id| !id.is_empty())
    }
}
