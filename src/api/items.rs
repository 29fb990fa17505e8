//! Item and comment endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        comment::{CommentDetails, CreateComment},
        item::{CreateItem, Item, ItemDetails, ItemSearchQuery, UpdateItem},
    },
    AppState,
};

use super::{AppJson, AppPath, AppQuery, SharerId};

/// List the caller's items
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Items of the caller with bookings and comments", body = Vec<ItemDetails>),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
) -> AppResult<Json<Vec<ItemDetails>>> {
    let items = state.services.items.list_owner_items(user_id).await?;
    Ok(Json(items))
}

/// Get item details by ID
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemDetails),
        (status = 404, description = "Item or user not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ItemDetails>> {
    let item = state.services.items.get_item(id, user_id).await?;
    Ok(Json(item))
}

/// Search available items by text
#[utoipa::path(
    get,
    path = "/items/search",
    tag = "items",
    params(
        ("text" = String, Query, description = "Text looked up in name and description")
    ),
    responses(
        (status = 200, description = "Matching available items", body = Vec<Item>)
    )
)]
pub async fn search_items(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ItemSearchQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let items = state.services.items.search(&query.text).await?;
    Ok(Json(items))
}

/// List a new item
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Owner user ID")
    ),
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Owner or request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppJson(item): AppJson<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let created = state.services.items.create_item(user_id, item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an item (owner only)
#[utoipa::path(
    patch,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Owner user ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 404, description = "Item not found for this owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppPath(id): AppPath<i64>,
    AppJson(update): AppJson<UpdateItem>,
) -> AppResult<Json<Item>> {
    let updated = state.services.items.update_item(id, user_id, update).await?;
    Ok(Json(updated))
}

/// Comment on an item after a completed booking
#[utoipa::path(
    post,
    path = "/items/{id}/comment",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Author user ID")
    ),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment added", body = CommentDetails),
        (status = 400, description = "Empty text or no completed booking", body = crate::error::ErrorResponse),
        (status = 404, description = "Item or user not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_comment(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppPath(id): AppPath<i64>,
    AppJson(comment): AppJson<CreateComment>,
) -> AppResult<(StatusCode, Json<CommentDetails>)> {
    let created = state.services.items.add_comment(id, user_id, comment).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
