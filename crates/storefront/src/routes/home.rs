//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::filters;
use crate::pages::{HomePage, LoadState};
use crate::state::AppState;
use crate::views::{CategoryView, HeaderView, ProductCardView, Section};

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub header: HeaderView,
    pub featured: Section<ProductCardView>,
    pub categories: Section<CategoryView>,
    /// Only present for a signed-in user.
    pub recommendations: Option<Section<ProductCardView>>,
}

impl HomeTemplate {
    #[must_use]
    pub fn new(header: HeaderView, page: &HomePage) -> Self {
        let signed_in = header.signed_in;
        Self {
            featured: Section::from_fetched(&page.featured, |p| {
                ProductCardView::new(p, signed_in)
            }),
            categories: Section::from_fetched(&page.categories, |c| CategoryView::new(c, None)),
            recommendations: page.recommendations.as_ref().map(|fetched| {
                Section::from_fetched(fetched, |p| ProductCardView::new(p, signed_in))
            }),
            header,
        }
    }
}

#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Response {
    let load = state.pages().home();
    let header = state.header();

    match load.settled().await {
        LoadState::Ready(page) => HomeTemplate::new(header, &page).into_response(),
        other => super::unsettled(other, header, "/"),
    }
}
