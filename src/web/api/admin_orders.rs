//! `/api/admin/orders`: order management for admins.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::{ApiError, NotFoundError, OrNotFound};
use crate::model::{Order, OrderStatus};
use crate::store::OrderScope;
use crate::web::api::Message;
use crate::web::api::orders::ORDER;
use crate::web::extract::{AdminPrincipal, ApiJson, blocking};

pub async fn list(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.store.orders.clone();
    Ok(Json(blocking(move || orders.list(OrderScope::All)).await?))
}

pub async fn show(
    State(state): State<AppState>,
    _admin: AdminPrincipal,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let orders = state.store.orders.clone();
    let order = blocking(move || orders.find(&id)).await?;
    Ok(Json(order.or_not_found(ORDER)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

pub async fn update_status(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> Result<Json<Order>, ApiError> {
    let status: OrderStatus = body
        .status
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ApiError::bad_request("Invalid status"))?;

    let now = state.now();
    let orders = state.store.orders.clone();
    let order = blocking(move || {
        if orders.find(&id)?.is_none() {
            return Ok(None);
        }
        orders.update_status(&id, status, now)?;
        orders.find(&id)
    })
    .await?
    .or_not_found(ORDER)?;

    tracing::info!(order_id = %order.id, admin_id = %admin.id, %status, "order status changed");
    Ok(Json(order))
}

pub async fn remove(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let orders = state.store.orders.clone();
    let target = id.clone();
    if !blocking(move || orders.delete(&target)).await? {
        return Err(NotFoundError::new(ORDER).into());
    }

    tracing::info!(order_id = %id, admin_id = %admin.id, "order deleted");
    Ok(Json(Message::new("Order deleted successfully")))
}
