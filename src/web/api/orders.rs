//! `/api/orders`: a signed-in customer's own orders.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::Principal;
use crate::error::{ApiError, OrNotFound};
use crate::model::{Order, OrderLine};
use crate::store::OrderScope;
use crate::web::extract::{ApiJson, blocking};

pub(crate) const ORDER: &str = "Order";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub fetch_all: Option<String>,
}

/// Own orders, or every order when an admin passes `fetchAll=true`.
pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let fetch_all = query.fetch_all.as_deref() == Some("true") && principal.is_admin();
    let orders = state.store.orders.clone();

    let list = blocking(move || {
        let scope = if fetch_all {
            OrderScope::All
        } else {
            OrderScope::User(&principal.id)
        };
        orders.list(scope)
    })
    .await?;

    Ok(Json(list))
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let now = state.now();
    let store = state.store.clone();

    let outcome = blocking(move || {
        let catalog = store.products.list()?;
        let order = match Order::place(&principal.id, &req.items, &catalog, now) {
            Ok(order) => order,
            Err(rejection) => return Ok(Err(ApiError::bad_request(rejection.to_string()))),
        };
        store.orders.insert(&order)?;
        let stored = store.orders.find(&order.id)?.unwrap_or(order);
        Ok(Ok(stored))
    })
    .await?;

    let order = outcome?;
    tracing::info!(
        order_id = %order.id,
        user_id = %order.user_id,
        total = order.total_amount,
        "order placed"
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// Visible to the owner and to admins.
pub async fn show(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let orders = state.store.orders.clone();
    let order = blocking(move || orders.find(&id)).await?.or_not_found(ORDER)?;

    if !principal.is_admin() && !order.is_owned_by(&principal.id) {
        return Err(ApiError::Forbidden("Forbidden".into()));
    }
    Ok(Json(order))
}
