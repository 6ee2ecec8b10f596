//! Order HTTP handlers

use super::model::{CreateOrderRequest, Order};
use crate::core::entity::Entity;
use crate::core::envelope::{LinkBuilder, Linked, RequestHint};
use crate::core::error::{ApiError, ApiResult, EntityError};
use crate::core::extractors::Validated;
use crate::core::repository::Repository;
use crate::entities::product::Product;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Value, json};

/// Order-specific AppState
#[derive(Clone)]
pub struct OrderAppState {
    pub orders: Repository<Order>,
    pub products: Repository<Product>,
    pub links: LinkBuilder,
}

fn collection_hint(links: &LinkBuilder) -> RequestHint {
    RequestHint::new("GET_ALL_ORDERS", links.collection(Order::resource_name()))
}

fn create_hint(links: &LinkBuilder) -> RequestHint {
    RequestHint::new("POST", links.collection(Order::resource_name())).with_body(json!({
        "productId": "ID",
        "quantity": "Number",
    }))
}

pub async fn list_orders(State(state): State<OrderAppState>) -> ApiResult<Json<Value>> {
    let orders: Vec<Linked<Order>> = state
        .orders
        .find_all(&Order::projection(), Some(&Order::list_populate()))
        .await?
        .into_iter()
        .map(|order| {
            let request = state.links.self_link(Order::resource_name(), &order.id);
            Linked::new(order, request)
        })
        .collect();

    Ok(Json(json!({
        "count": orders.len(),
        "orders": orders,
    })))
}

/// Place an order for an existing product
///
/// The product lookup and the insert are two separate store calls; a
/// product deleted in between still gets the order.
pub async fn create_order(
    State(state): State<OrderAppState>,
    Validated(payload): Validated<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let product = state
        .products
        .find_by_id(&payload.product_id, &Product::projection(), None)
        .await?
        .ok_or_else(|| {
            EntityError::not_found(Product::resource_name_singular(), &payload.product_id)
        })?;

    let order = state
        .orders
        .insert(Order::new(&product.id, payload.quantity))
        .await?;

    tracing::info!(id = %order.id, product = %product.id, quantity = order.quantity, "order placed");

    let request = state.links.self_link(Order::resource_name(), &order.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order is placed",
            "orderPlaced": order,
            "request": request,
        })),
    ))
}

pub async fn get_order(
    State(state): State<OrderAppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let order = state
        .orders
        .find_by_id(&id, &Order::projection(), Some(&Order::detail_populate()))
        .await?
        .ok_or_else(|| {
            ApiError::from(EntityError::not_found(Order::resource_name_singular(), &id))
                .with_request(collection_hint(&state.links))
        })?;

    Ok(Json(json!({
        "message": format!("Handling GET request for order having {}", id),
        "order": order,
        "request": collection_hint(&state.links),
    })))
}

/// Cancel an order
///
/// Answers `404` when no order matched, the same contract as
/// `delete_product`, rather than confirming a cancellation that did not
/// happen.
pub async fn delete_order(
    State(state): State<OrderAppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.orders.delete_by_id(&id).await?.ok_or_else(|| {
        ApiError::from(EntityError::not_found(Order::resource_name_singular(), &id))
            .with_request(create_hint(&state.links))
    })?;

    tracing::info!(%id, "order cancelled");

    Ok(Json(json!({
        "message": "Order Cancelled Successfully",
        "request": create_hint(&state.links),
    })))
}
