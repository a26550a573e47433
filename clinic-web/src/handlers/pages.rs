//! Public pages and the dashboard. Handlers stay thin: fetch from the
//! catalog store, sanitize rich text, hand the result to an askama template.

use crate::AppState;
use crate::error::AppError;
use crate::middleware::session_gate::CurrentSession;
use crate::models::{PriceCategory, Service, ServiceCategory};
use crate::services::sanitize::clean_rich_text;
use askama::Template;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {}

pub async fn index() -> impl IntoResponse {
    IndexTemplate {}
}

pub struct ServiceView {
    pub title: String,
    pub description_html: String,
    pub image_url: Option<String>,
}

pub struct ServiceCategoryView {
    pub title: String,
    pub services: Vec<ServiceView>,
}

#[derive(Template)]
#[template(path = "services.html")]
pub struct ServicesTemplate {
    pub categories: Vec<ServiceCategoryView>,
}

pub async fn services_page(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = state.catalog.list_service_categories().await?;
    let services = state.catalog.list_services().await?;

    let categories = categories
        .into_iter()
        .map(|category| ServiceCategoryView {
            services: services
                .iter()
                .filter(|service| service.category_id == category.id)
                .map(|service| ServiceView {
                    title: service.title.clone(),
                    description_html: clean_rich_text(&service.description),
                    image_url: service
                        .image_key
                        .as_deref()
                        .map(|key| state.images.public_url(key)),
                })
                .collect(),
            title: category.title,
        })
        .collect();

    Ok(ServicesTemplate { categories })
}

pub struct PriceItemView {
    pub name: String,
    pub price: String,
}

pub struct PriceCategoryView {
    pub title: String,
    pub description_html: String,
    pub items: Vec<PriceItemView>,
}

#[derive(Template)]
#[template(path = "prices.html")]
pub struct PricesTemplate {
    pub categories: Vec<PriceCategoryView>,
}

pub async fn prices_page(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = state.catalog.list_price_categories().await?;
    let items = state.catalog.list_price_items().await?;

    let categories = categories
        .into_iter()
        .map(|category| PriceCategoryView {
            items: items
                .iter()
                .filter(|item| item.category_id == category.id)
                .map(|item| PriceItemView {
                    name: item.name.clone(),
                    price: item.price.clone(),
                })
                .collect(),
            description_html: clean_rich_text(&category.description),
            title: category.title,
        })
        .collect();

    Ok(PricesTemplate { categories })
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub booking_embed_url: String,
}

pub async fn contact_page(State(state): State<AppState>) -> impl IntoResponse {
    ContactTemplate {
        booking_embed_url: state.settings.site.booking_embed_url.clone(),
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub account: String,
    pub price_categories: Vec<PriceCategory>,
    pub service_categories: Vec<ServiceCategory>,
    pub services: Vec<Service>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<impl IntoResponse, AppError> {
    let session = session.require()?;

    let price_categories = state.catalog.list_price_categories().await?;
    let service_categories = state.catalog.list_service_categories().await?;
    let services = state.catalog.list_services().await?;

    Ok(DashboardTemplate {
        account: session.email.unwrap_or(session.user_id),
        price_categories,
        service_categories,
        services,
    })
}

#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NotFoundTemplate {})
}
