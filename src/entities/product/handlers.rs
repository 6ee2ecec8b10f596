//! Product HTTP handlers

use super::model::{CreateProductForm, Product};
use crate::core::auth::AuthProvider;
use crate::core::entity::Entity;
use crate::core::envelope::{LinkBuilder, Linked, RequestHint};
use crate::core::error::{ApiError, ApiResult, EntityError};
use crate::core::extractors::{Authenticated, JsonBody};
use crate::core::repository::Repository;
use crate::core::upload::{ImageUpload, UploadPolicy};
use crate::core::validation::PatchOperation;
use axum::extract::{FromRef, Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Value, json};
use std::sync::Arc;

/// Product-specific AppState
#[derive(Clone, FromRef)]
pub struct ProductAppState {
    pub products: Repository<Product>,
    pub auth: Arc<dyn AuthProvider>,
    pub uploads: Arc<UploadPolicy>,
    pub links: LinkBuilder,
}

fn collection_hint(links: &LinkBuilder) -> RequestHint {
    RequestHint::get(links.collection(Product::resource_name()))
        .with_description("GET_ALL_PRODUCTS")
}

fn create_hint(links: &LinkBuilder) -> RequestHint {
    RequestHint::new("POST", links.collection(Product::resource_name())).with_body(json!({
        "name": "String",
        "price": "Number",
        "productImage": "File",
    }))
}

fn linked(links: &LinkBuilder, product: Product) -> Linked<Product> {
    let request = links.self_link(Product::resource_name(), &product.id);
    Linked::new(product, request)
}

pub async fn list_products(State(state): State<ProductAppState>) -> ApiResult<Json<Value>> {
    let products: Vec<Linked<Product>> = state
        .products
        .find_all(&Product::projection(), None)
        .await?
        .into_iter()
        .map(|product| linked(&state.links, product))
        .collect();

    Ok(Json(json!({
        "count": products.len(),
        "products": products,
    })))
}

/// Create a product from a multipart form
///
/// The image is written only once the text fields are valid, so a
/// rejected form never replaces a stored file. A store failure after the
/// write leaves the new file on disk: it may have replaced a same-named
/// image another product still points at, so it is not removed.
pub async fn create_product(
    State(state): State<ProductAppState>,
    Authenticated(caller): Authenticated,
    upload: ImageUpload,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let file = upload.require_file(&state.uploads.field_name)?;
    let form = CreateProductForm::from_fields(&upload.fields)?;
    let image = file.store(&state.uploads).await?;

    let product = state
        .products
        .insert(Product::new(&form.name, form.price, image))
        .await?;

    tracing::info!(id = %product.id, subject = caller.subject(), "product created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Created Product",
            "createdProduct": linked(&state.links, product),
        })),
    ))
}

pub async fn get_product(
    State(state): State<ProductAppState>,
    Authenticated(_): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let product = state
        .products
        .find_by_id(&id, &Product::projection(), None)
        .await?
        .ok_or_else(|| {
            ApiError::from(EntityError::not_found(Product::resource_name_singular(), &id))
                .with_request(collection_hint(&state.links))
        })?;

    Ok(Json(json!({
        "product": product,
        "request": collection_hint(&state.links),
    })))
}

pub async fn update_product(
    State(state): State<ProductAppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    JsonBody(operations): JsonBody<Vec<PatchOperation>>,
) -> ApiResult<Json<Value>> {
    let fields = Product::patch_rules().fold(operations)?;
    let outcome = state.products.update_fields(&id, fields).await?;

    tracing::info!(
        %id,
        matched = outcome.matched,
        modified = outcome.modified,
        subject = caller.subject(),
        "product updated"
    );

    Ok(Json(json!({
        "message": "Updated Successfully",
        "request": state.links.self_link(Product::resource_name(), &id),
    })))
}

pub async fn delete_product(
    State(state): State<ProductAppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let product = state.products.delete_by_id(&id).await?.ok_or_else(|| {
        ApiError::from(EntityError::not_found(Product::resource_name_singular(), &id))
            .with_request(create_hint(&state.links))
    })?;

    tracing::info!(%id, "product deleted");

    Ok(Json(json!({
        "message": "Product deleted",
        "product": product,
        "request": create_hint(&state.links),
    })))
}
