//! Home page: featured products, categories, and personal recommendations
//! for a signed-in user.

use electromart_core::{Category, Product};

use super::{Fetched, LoadState, LoadTask, PageLoader};
use crate::api::ProductQuery;

/// Everything the home page shows.
#[derive(Debug, Clone)]
pub struct HomePage {
    pub featured: Fetched<Vec<Product>>,
    pub categories: Fetched<Vec<Category>>,
    /// `None` when nobody is signed in; the section is not shown at all.
    pub recommendations: Option<Fetched<Vec<Product>>>,
}

impl PageLoader {
    /// Start loading the home page.
    #[must_use]
    pub fn home(&self) -> LoadTask<HomePage> {
        let loader = self.clone();
        LoadTask::spawn(async move { loader.load_home().await })
    }

    async fn load_home(&self) -> LoadState<HomePage> {
        let featured_query = ProductQuery::limit(self.limits.featured);
        let token = self.session.token();

        let recommendations = async {
            match &token {
                Some(token) => Some(
                    self.api
                        .recommendations(token, self.limits.recommendations)
                        .await,
                ),
                None => None,
            }
        };

        let (featured, categories, recommendations) = tokio::join!(
            self.api.products(&featured_query),
            self.api.categories(),
            recommendations,
        );

        LoadState::Ready(HomePage {
            featured: Fetched::from_result(featured, "featured products"),
            categories: Fetched::from_result(categories, "categories"),
            recommendations: recommendations
                .map(|result| Fetched::from_result(result, "recommendations")),
        })
    }
}
