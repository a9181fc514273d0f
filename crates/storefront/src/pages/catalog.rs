//! Catalog pages: product listing, product detail, categories.

use electromart_core::{Category, Product, ProductId, Review};

use super::{Fetched, LoadState, LoadTask, PageLoader};
use crate::api::ProductQuery;

/// The product listing, optionally narrowed to one category.
#[derive(Debug, Clone)]
pub struct ProductListPage {
    pub category: Option<String>,
    pub products: Fetched<Vec<Product>>,
    /// For the filter bar.
    pub categories: Fetched<Vec<Category>>,
}

/// One product and its reviews.
#[derive(Debug, Clone)]
pub struct ProductDetailPage {
    pub product: Fetched<Product>,
    pub reviews: Fetched<Vec<Review>>,
}

#[derive(Debug, Clone)]
pub struct CategoriesPage {
    pub categories: Fetched<Vec<Category>>,
}

impl PageLoader {
    /// Start loading the product listing.
    ///
    /// `limit` falls back to the configured page size.
    #[must_use]
    pub fn products(
        &self,
        category: Option<String>,
        limit: Option<u32>,
    ) -> LoadTask<ProductListPage> {
        let loader = self.clone();
        let category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let limit = limit.filter(|l| *l > 0).unwrap_or(self.limits.products);

        LoadTask::spawn(async move {
            let mut query = ProductQuery::limit(limit);
            if let Some(category) = &category {
                query = query.in_category(category.clone());
            }

            let (products, categories) =
                tokio::join!(loader.api.products(&query), loader.api.categories());

            LoadState::Ready(ProductListPage {
                category,
                products: Fetched::from_result(products, "products"),
                categories: Fetched::from_result(categories, "categories"),
            })
        })
    }

    /// Start loading one product with its reviews.
    #[must_use]
    pub fn product(&self, id: ProductId) -> LoadTask<ProductDetailPage> {
        let loader = self.clone();
        LoadTask::spawn(async move {
            let (product, reviews) = tokio::join!(
                loader.api.product(&id),
                loader.api.product_reviews(&id, loader.limits.reviews),
            );

            LoadState::Ready(ProductDetailPage {
                product: Fetched::from_result(product, "product"),
                reviews: Fetched::from_result(reviews, "reviews"),
            })
        })
    }

    /// Start loading the category listing.
    #[must_use]
    pub fn categories(&self) -> LoadTask<CategoriesPage> {
        let loader = self.clone();
        LoadTask::spawn(async move {
            LoadState::Ready(CategoriesPage {
                categories: Fetched::from_result(loader.api.categories().await, "categories"),
            })
        })
    }
}
