//! Catalog Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::broadcast::ProductBroadcaster;
use crate::application::config::CatalogConfig;
use crate::domain::repository::{CartRepository, ProductRepository};
use crate::presentation::handlers::{self, CatalogAppState};
use crate::presentation::views;

/// JSON API under `/api` plus the HTML pages.
///
/// `broadcaster` receives the full product list after every product write.
pub fn catalog_router<P, C>(
    products: Arc<P>,
    carts: Arc<C>,
    config: CatalogConfig,
    broadcaster: Arc<dyn ProductBroadcaster>,
) -> Router
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let state = CatalogAppState {
        products,
        carts,
        config: Arc::new(config),
        broadcaster,
    };

    Router::new()
        .route(
            "/api/products",
            get(handlers::list_products::<P, C>).post(handlers::create_product::<P, C>),
        )
        .route(
            "/api/products/{pid}",
            get(handlers::get_product::<P, C>)
                .put(handlers::update_product::<P, C>)
                .delete(handlers::delete_product::<P, C>),
        )
        .route("/api/carts", post(handlers::create_cart::<P, C>))
        .route(
            "/api/carts/{cid}",
            get(handlers::get_cart::<P, C>)
                .put(handlers::replace_cart::<P, C>)
                .delete(handlers::clear_cart::<P, C>),
        )
        .route(
            "/api/carts/{cid}/products/{pid}",
            post(handlers::add_to_cart::<P, C>)
                .put(handlers::set_cart_quantity::<P, C>)
                .delete(handlers::remove_from_cart::<P, C>),
        )
        .route(
            "/api/carts/{cid}/product/{pid}",
            post(handlers::add_to_cart::<P, C>),
        )
        .route("/", get(views::home::<P, C>))
        .route("/products/{pid}", get(views::product_detail::<P, C>))
        .route("/carts/{cid}", get(views::cart_detail::<P, C>))
        .route("/realtimeproducts", get(views::realtime_products::<P, C>))
        .route("/chat", get(views::chat))
        .with_state(state)
}
