//! What the product screens show.

use shopcart_core::{ProductCandidate, ProductId, Quantity};

use crate::error::CatalogError;
use crate::mapping::{listed_candidates, suggested_candidates};
use crate::source::ProductSource;

/// Which list a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogList {
    Products,
    Suggested,
}

/// Both product lists, loaded independently.
///
/// A list that failed to load is empty and its error is kept in `failures`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub products: Vec<ProductCandidate>,
    pub suggested: Vec<ProductCandidate>,
    pub failures: Vec<(CatalogList, CatalogError)>,
}

impl Catalog {
    /// Fetch both lists concurrently.
    pub async fn load<P>(source: &P) -> Self
    where
        P: ProductSource + ?Sized,
    {
        let (products, suggested) = tokio::join!(source.products(), source.suggested_products());
        let mut catalog = Self::default();

        match products {
            Ok(listings) => catalog.products = listed_candidates(listings),
            Err(err) => {
                tracing::error!(error = %err, "failed to load products");
                catalog.failures.push((CatalogList::Products, err));
            }
        }
        match suggested {
            Ok(lists) => catalog.suggested = suggested_candidates(lists),
            Err(err) => {
                tracing::error!(error = %err, "failed to load suggested products");
                catalog.failures.push((CatalogList::Suggested, err));
            }
        }

        tracing::info!(
            products = catalog.products.len(),
            suggested = catalog.suggested.len(),
            failures = catalog.failures.len(),
            "catalog loaded"
        );
        catalog
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Stamp every candidate with its current cart quantity (zero when absent).
    pub fn apply_cart_quantities<F>(&mut self, mut quantity_of: F)
    where
        F: FnMut(&ProductId) -> Option<Quantity>,
    {
        for candidate in self.products.iter_mut().chain(self.suggested.iter_mut()) {
            candidate.quantity = quantity_of(&candidate.id).unwrap_or(Quantity::ZERO);
        }
    }

    pub fn find(&self, id: &ProductId) -> Option<&ProductCandidate> {
        self.products
            .iter()
            .chain(self.suggested.iter())
            .find(|candidate| &candidate.id == id)
    }
}
