//! HTTP Handlers (JSON API)

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::id::{CartId, ProductId};
use std::sync::Arc;

use crate::application::broadcast::ProductBroadcaster;
use crate::application::config::CatalogConfig;
use crate::application::manage_carts::ManageCartsUseCase;
use crate::application::manage_products::ManageProductsUseCase;
use crate::domain::entity::ProductDraft;
use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::value_object::Quantity;
use crate::error::CatalogResult;
use crate::presentation::dto::{
    ApiJson, CartResponse, ListProductsParams, MessageResponse, ProductPageResponse,
    ProductResponse, QuantityRequest, ReplaceCartRequest,
};

/// Shared state for catalog handlers
pub struct CatalogAppState<P, C>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    pub products: Arc<P>,
    pub carts: Arc<C>,
    pub config: Arc<CatalogConfig>,
    pub broadcaster: Arc<dyn ProductBroadcaster>,
}

impl<P, C> Clone for CatalogAppState<P, C>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            products: self.products.clone(),
            carts: self.carts.clone(),
            config: self.config.clone(),
            broadcaster: self.broadcaster.clone(),
        }
    }
}

impl<P, C> CatalogAppState<P, C>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    pub fn product_use_case(&self) -> ManageProductsUseCase<P> {
        ManageProductsUseCase::new(self.products.clone(), self.broadcaster.clone())
    }

    pub fn cart_use_case(&self) -> ManageCartsUseCase<C, P> {
        ManageCartsUseCase::new(self.carts.clone(), self.products.clone())
    }
}

/// GET /api/products
pub async fn list_products<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Query(params): Query<ListProductsParams>,
) -> CatalogResult<Json<ProductPageResponse>>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let query = params.into_query(&state.config)?;
    let page = state.product_use_case().list(&query).await?;

    Ok(Json(ProductPageResponse::new(page, "/api/products", &query)))
}

/// GET /api/products/{pid}
pub async fn get_product<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Path(pid): Path<String>,
) -> CatalogResult<Json<ProductResponse>>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let id: ProductId = pid.parse()?;
    let product = state.product_use_case().get(&id).await?;

    Ok(Json(ProductResponse { product }))
}

/// POST /api/products
pub async fn create_product<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> CatalogResult<impl IntoResponse>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let product = state.product_use_case().create(draft).await?;

    Ok((StatusCode::CREATED, Json(ProductResponse { product })))
}

/// PUT /api/products/{pid}
pub async fn update_product<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Path(pid): Path<String>,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> CatalogResult<Json<ProductResponse>>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let id: ProductId = pid.parse()?;
    let product = state.product_use_case().update(&id, draft).await?;

    Ok(Json(ProductResponse { product }))
}

/// DELETE /api/products/{pid}
pub async fn delete_product<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Path(pid): Path<String>,
) -> CatalogResult<Json<MessageResponse>>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let id: ProductId = pid.parse()?;
    state.product_use_case().delete(&id).await?;

    Ok(Json(MessageResponse {
        message: format!("Product {} deleted", id),
    }))
}

/// POST /api/carts
pub async fn create_cart<P, C>(
    State(state): State<CatalogAppState<P, C>>,
) -> CatalogResult<impl IntoResponse>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let cart = state.cart_use_case().create().await?;

    Ok((StatusCode::CREATED, Json(CartResponse { cart })))
}

/// GET /api/carts/{cid}
pub async fn get_cart<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Path(cid): Path<String>,
) -> CatalogResult<impl IntoResponse>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let id: CartId = cid.parse()?;
    let cart = state.cart_use_case().detail(&id).await?;

    Ok(Json(CartResponse { cart }))
}

/// PUT /api/carts/{cid}
pub async fn replace_cart<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Path(cid): Path<String>,
    ApiJson(req): ApiJson<ReplaceCartRequest>,
) -> CatalogResult<impl IntoResponse>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let id: CartId = cid.parse()?;
    let items = req.into_line_items()?;
    let cart = state.cart_use_case().replace_products(&id, items).await?;

    Ok(Json(CartResponse { cart }))
}

/// DELETE /api/carts/{cid}
pub async fn clear_cart<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Path(cid): Path<String>,
) -> CatalogResult<impl IntoResponse>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let id: CartId = cid.parse()?;
    let cart = state.cart_use_case().clear(&id).await?;

    Ok(Json(CartResponse { cart }))
}

/// POST /api/carts/{cid}/products/{pid}
///
/// The body is optional; a missing or non-positive quantity adds one unit.
/// A body that is present must be valid JSON.
pub async fn add_to_cart<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Path((cid, pid)): Path<(String, String)>,
    body: Bytes,
) -> CatalogResult<impl IntoResponse>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let cart_id: CartId = cid.parse()?;
    let product_id: ProductId = pid.parse()?;
    let requested = if body.trim_ascii().is_empty() {
        None
    } else {
        let Json(req) = Json::<QuantityRequest>::from_bytes(&body)?;
        req.quantity
    };
    let quantity = Quantity::or_one(requested);

    let cart = state
        .cart_use_case()
        .add_product(&cart_id, &product_id, quantity)
        .await?;

    Ok(Json(CartResponse { cart }))
}

/// PUT /api/carts/{cid}/products/{pid}
pub async fn set_cart_quantity<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Path((cid, pid)): Path<(String, String)>,
    ApiJson(req): ApiJson<QuantityRequest>,
) -> CatalogResult<impl IntoResponse>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let cart_id: CartId = cid.parse()?;
    let product_id: ProductId = pid.parse()?;
    let quantity = req.exact()?;

    let cart = state
        .cart_use_case()
        .set_quantity(&cart_id, &product_id, quantity)
        .await?;

    Ok(Json(CartResponse { cart }))
}

/// DELETE /api/carts/{cid}/products/{pid}
pub async fn remove_from_cart<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Path((cid, pid)): Path<(String, String)>,
) -> CatalogResult<impl IntoResponse>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let cart_id: CartId = cid.parse()?;
    let product_id: ProductId = pid.parse()?;

    let cart = state
        .cart_use_case()
        .remove_product(&cart_id, &product_id)
        .await?;

    Ok(Json(CartResponse { cart }))
}
