//! Sharing request endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        page::PageQuery,
        request::{CreateItemRequest, ItemRequestDetails},
    },
    AppState,
};

use super::{AppJson, AppPath, AppQuery, SharerId};

/// Ask for an item nobody has listed yet
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Requester user ID")
    ),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Request created", body = ItemRequestDetails),
        (status = 400, description = "Empty description", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppJson(request): AppJson<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<ItemRequestDetails>)> {
    let created = state.services.requests.create_request(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List the caller's requests, oldest first
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Requester user ID")
    ),
    responses(
        (status = 200, description = "Own requests with answering items", body = Vec<ItemRequestDetails>)
    )
)]
pub async fn list_own_requests(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
) -> AppResult<Json<Vec<ItemRequestDetails>>> {
    let requests = state.services.requests.list_own(user_id).await?;
    Ok(Json(requests))
}

/// List requests of other users, newest first
#[utoipa::path(
    get,
    path = "/requests/all",
    tag = "requests",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user ID"),
        ("from" = Option<i64>, Query, description = "Offset, defaults to 0"),
        ("size" = Option<i64>, Query, description = "Page size, defaults to 10")
    ),
    responses(
        (status = 200, description = "Requests of other users", body = Vec<ItemRequestDetails>),
        (status = 400, description = "Invalid page", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_all_requests(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppQuery(page): AppQuery<PageQuery>,
) -> AppResult<Json<Vec<ItemRequestDetails>>> {
    let requests = state.services.requests.list_all(user_id, page).await?;
    Ok(Json(requests))
}

/// Get one request with its answering items
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(
        ("id" = i64, Path, description = "Request ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Request details", body = ItemRequestDetails),
        (status = 404, description = "Request or user not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ItemRequestDetails>> {
    let request = state.services.requests.get_request(id, user_id).await?;
    Ok(Json(request))
}
