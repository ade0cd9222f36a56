//! Server-rendered pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use kernel::id::{CartId, ProductId};
use kernel::pagination::Page;

use crate::domain::entity::{CartDetail, Product};
use crate::domain::repository::{CartRepository, ProductRepository};
use crate::domain::value_object::{Category, PriceSort};
use crate::error::CatalogError;
use crate::presentation::dto::{ListProductsParams, page_link};
use crate::presentation::handlers::CatalogAppState;

fn category_names() -> Vec<&'static str> {
    Category::ALL.iter().map(|c| c.as_str()).collect()
}

/// `<option>` entry for a filter select
pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

/// Product listing (home page).
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: Page<Product>,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
    pub categories: Vec<SelectOption>,
    pub sorts: Vec<SelectOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub product: Product,
}

#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub cart: CartDetail,
}

/// Live product list with create/delete forms over the socket channel.
#[derive(Template, WebTemplate)]
#[template(path = "realtime_products.html")]
pub struct RealtimeProductsTemplate {
    pub products: Vec<Product>,
    pub categories: Vec<&'static str>,
}

#[derive(Template, WebTemplate)]
#[template(path = "chat.html")]
pub struct ChatTemplate {}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub title: &'static str,
    pub message: String,
}

/// Error rendered as an HTML page with the failing status
#[derive(Debug)]
pub struct ErrorPage {
    status: StatusCode,
    message: String,
}

impl From<CatalogError> for ErrorPage {
    fn from(err: CatalogError) -> Self {
        err.log();
        let app_error = AppError::from(err);
        Self {
            status: StatusCode::from_u16(app_error.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: app_error.message().to_string(),
        }
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let template = ErrorTemplate {
            status: self.status.as_u16(),
            title: self.status.canonical_reason().unwrap_or("Error"),
            message: self.message,
        };

        match template.render() {
            Ok(html) => (self.status, axum::response::Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (self.status, template.message).into_response()
            }
        }
    }
}

/// GET /
pub async fn home<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Query(params): Query<ListProductsParams>,
) -> Result<HomeTemplate, ErrorPage>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let query = params.into_query(&state.config)?;
    let page = state.product_use_case().list(&query).await?;

    Ok(HomeTemplate {
        prev_link: page.prev_page.map(|p| page_link("/", p, &query)),
        next_link: page.next_page.map(|p| page_link("/", p, &query)),
        page,
        categories: Category::ALL
            .iter()
            .map(|c| SelectOption {
                value: c.as_str(),
                selected: query.filter.category == Some(*c),
            })
            .collect(),
        sorts: [PriceSort::Asc, PriceSort::Desc]
            .iter()
            .map(|s| SelectOption {
                value: s.as_str(),
                selected: query.sort == Some(*s),
            })
            .collect(),
    })
}

/// GET /products/{pid}
pub async fn product_detail<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Path(pid): Path<String>,
) -> Result<ProductTemplate, ErrorPage>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let id: ProductId = pid.parse().map_err(CatalogError::from)?;
    let product = state.product_use_case().get(&id).await?;

    Ok(ProductTemplate { product })
}

/// GET /carts/{cid}
pub async fn cart_detail<P, C>(
    State(state): State<CatalogAppState<P, C>>,
    Path(cid): Path<String>,
) -> Result<CartTemplate, ErrorPage>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let id: CartId = cid.parse().map_err(CatalogError::from)?;
    let cart = state.cart_use_case().detail(&id).await?;

    Ok(CartTemplate { cart })
}

/// GET /realtimeproducts
pub async fn realtime_products<P, C>(
    State(state): State<CatalogAppState<P, C>>,
) -> Result<RealtimeProductsTemplate, ErrorPage>
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let products = state.product_use_case().list_all().await?;

    Ok(RealtimeProductsTemplate {
        products,
        categories: category_names(),
    })
}

/// GET /chat
pub async fn chat() -> ChatTemplate {
    ChatTemplate {}
}

/// Fallback for unknown paths
pub async fn not_found() -> ErrorPage {
    ErrorPage {
        status: StatusCode::NOT_FOUND,
        message: "Page not found".to_string(),
    }
}
