//! Sharing requests ("I am looking for ...")

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::item::Item;

/// Request record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub id: i64,
    pub requester_id: i64,
    pub description: String,
    pub created: DateTime<Utc>,
}

/// Create request payload
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub description: Option<String>,
}

/// Request with the items listed in answer to it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestDetails {
    pub id: i64,
    pub description: String,
    pub created: DateTime<Utc>,
    pub items: Vec<Item>,
}

impl ItemRequestDetails {
    /// Attach the items whose `request_id` points at `request`
    pub fn new(request: ItemRequest, all_items: &[Item]) -> Self {
        let items = all_items
            .iter()
            .filter(|item| item.request_id == Some(request.id))
            .cloned()
            .collect();
        Self {
            id: request.id,
            description: request.description,
            created: request.created,
            items,
        }
    }
}
