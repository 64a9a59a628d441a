//! `/api/products`: the public catalog and its admin maintenance.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::app::AppState;
use crate::error::{ApiError, NotFoundError, OrNotFound, is_duplicate_key};
use crate::model::{Product, ProductDraft, ProductPatch, new_id};
use crate::web::api::Message;
use crate::web::extract::{AdminPrincipal, ApiJson, blocking};

const PRODUCT: &str = "Product";
const DUPLICATE_NAME: &str = "A product with this name already exists";

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.store.products.clone();
    Ok(Json(blocking(move || products.list()).await?))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let products = state.store.products.clone();
    let product = blocking(move || products.find(&id)).await?;
    Ok(Json(product.or_not_found(PRODUCT)?))
}

pub async fn create(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = draft
        .into_product(new_id(), state.now())
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let products = state.store.products.clone();
    let product = blocking(move || {
        if products.find_by_name(&product.name)?.is_some() {
            return Ok(None);
        }
        match products.insert(&product) {
            Ok(()) => Ok(Some(product)),
            Err(e) if is_duplicate_key(&e) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await?
    .ok_or_else(|| ApiError::bad_request(DUPLICATE_NAME))?;

    tracing::info!(product_id = %product.id, admin_id = %admin.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    let now = state.now();
    let products = state.store.products.clone();

    let outcome = blocking(move || {
        let Some(mut product) = products.find(&id)? else {
            return Ok(Err(ApiError::from(NotFoundError::new(PRODUCT))));
        };
        if let Err(rejection) = patch.apply(&mut product, now) {
            return Ok(Err(ApiError::bad_request(rejection.to_string())));
        }
        if let Some(other) = products.find_by_name(&product.name)? {
            if other.id != product.id {
                return Ok(Err(ApiError::bad_request(DUPLICATE_NAME)));
            }
        }
        match products.update(&product) {
            Ok(()) => Ok(Ok(product)),
            Err(e) if is_duplicate_key(&e) => Ok(Err(ApiError::bad_request(DUPLICATE_NAME))),
            Err(e) => Err(e),
        }
    })
    .await?;

    let product = outcome?;
    tracing::info!(product_id = %product.id, admin_id = %admin.id, "product updated");
    Ok(Json(product))
}

pub async fn remove(
    State(state): State<AppState>,
    AdminPrincipal(admin): AdminPrincipal,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let products = state.store.products.clone();
    let target = id.clone();
    if !blocking(move || products.delete(&target)).await? {
        return Err(NotFoundError::new(PRODUCT).into());
    }

    tracing::info!(product_id = %id, admin_id = %admin.id, "product deleted");
    Ok(Json(Message::new("Product deleted successfully")))
}
