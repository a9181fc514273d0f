//! Category listing route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::filters;
use crate::pages::LoadState;
use crate::state::AppState;
use crate::views::{CategoryView, HeaderView, Section};

#[derive(Template, WebTemplate)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub header: HeaderView,
    pub categories: Section<CategoryView>,
}

/// Display all categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Response {
    let load = state.pages().categories();
    let header = state.header();

    match load.settled().await {
        LoadState::Ready(page) => CategoriesTemplate {
            header,
            categories: Section::from_fetched(&page.categories, |c| CategoryView::new(c, None)),
        }
        .into_response(),
        other => super::unsettled(other, header, "/categories"),
    }
}
