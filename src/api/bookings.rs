//! Booking endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        booking::{ApprovalQuery, BookingDetails, BookingListQuery, BookingState, CreateBooking},
        page::{Page, PageQuery},
    },
    AppState,
};

use super::{AppJson, AppPath, AppQuery, SharerId};

/// Parse `state`, `from` and `size` of a listing request
fn listing_params(query: BookingListQuery) -> AppResult<(BookingState, Option<Page>)> {
    let state = BookingState::from_token(query.state.as_deref())?;
    let page = PageQuery {
        from: query.from,
        size: query.size,
    }
    .optional()?;
    Ok((state, page))
}

/// Request a booking
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker user ID")
    ),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created in WAITING status", body = BookingDetails),
        (status = 400, description = "Invalid dates or unavailable item", body = crate::error::ErrorResponse),
        (status = 404, description = "Item or user not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppJson(booking): AppJson<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingDetails>)> {
    let created = state.services.bookings.create_booking(user_id, booking).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Approve or reject a waiting booking (item owner only)
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = i64, Path, description = "Booking ID"),
        ("approved" = bool, Query, description = "Owner decision"),
        ("X-Sharer-User-Id" = i64, Header, description = "Owner user ID")
    ),
    responses(
        (status = 200, description = "Booking approved or rejected", body = BookingDetails),
        (status = 400, description = "Booking is not waiting", body = crate::error::ErrorResponse),
        (status = 404, description = "Booking not found for this owner", body = crate::error::ErrorResponse)
    )
)]
pub async fn approve_booking(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppPath(id): AppPath<i64>,
    AppQuery(query): AppQuery<ApprovalQuery>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state
        .services
        .bookings
        .approve_booking(id, user_id, query.approved)
        .await?;
    Ok(Json(booking))
}

/// Get a booking (booker or item owner)
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = i64, Path, description = "Booking ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user ID")
    ),
    responses(
        (status = 200, description = "Booking details", body = BookingDetails),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state.services.bookings.get_booking(id, user_id).await?;
    Ok(Json(booking))
}

/// List the caller's bookings
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker user ID"),
        ("state" = Option<String>, Query, description = "ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED"),
        ("from" = Option<i64>, Query, description = "Offset of the first booking"),
        ("size" = Option<i64>, Query, description = "Maximum number of bookings")
    ),
    responses(
        (status = 200, description = "Bookings, newest start first", body = Vec<BookingDetails>),
        (status = 400, description = "Unknown state or invalid page", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppQuery(query): AppQuery<BookingListQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let (booking_state, page) = listing_params(query)?;
    let bookings = state
        .services
        .bookings
        .list_for_booker(user_id, booking_state, page)
        .await?;
    Ok(Json(bookings))
}

/// List bookings of the caller's items
#[utoipa::path(
    get,
    path = "/bookings/owner",
    tag = "bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Owner user ID"),
        ("state" = Option<String>, Query, description = "ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED"),
        ("from" = Option<i64>, Query, description = "Offset of the first booking"),
        ("size" = Option<i64>, Query, description = "Maximum number of bookings")
    ),
    responses(
        (status = 200, description = "Bookings, newest start first", body = Vec<BookingDetails>),
        (status = 400, description = "Unknown state or invalid page", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_owner_bookings(
    State(state): State<AppState>,
    SharerId(user_id): SharerId,
    AppQuery(query): AppQuery<BookingListQuery>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let (booking_state, page) = listing_params(query)?;
    let bookings = state
        .services
        .bookings
        .list_for_owner(user_id, booking_state, page)
        .await?;
    Ok(Json(bookings))
}
