//! DTO → [`ProductCandidate`] mapping.
//!
//! Only the first list of each response is shown. Products that cannot become
//! a candidate (no id, no name, no or negative price) are skipped with a
//! warning rather than failing the whole list.

use rust_decimal::Decimal;
use shopcart_core::{ProductCandidate, ProductId, UnitPrice};

use crate::dto::{ListedProduct, ProductListing, SuggestedProduct, SuggestedProductList};

pub fn listed_candidates(listings: Vec<ProductListing>) -> Vec<ProductCandidate> {
    listings
        .into_iter()
        .next()
        .map(|listing| listing.products)
        .unwrap_or_default()
        .into_iter()
        .filter_map(listed_candidate)
        .collect()
}

pub fn suggested_candidates(lists: Vec<SuggestedProductList>) -> Vec<ProductCandidate> {
    lists
        .into_iter()
        .next()
        .map(|list| list.products)
        .unwrap_or_default()
        .into_iter()
        .filter_map(suggested_candidate)
        .collect()
}

fn listed_candidate(product: ListedProduct) -> Option<ProductCandidate> {
    let (Some(id), Some(name), Some(price)) = (product.id, product.name, product.price) else {
        tracing::warn!("skipping listed product with missing id, name or price");
        return None;
    };

    let mut candidate = candidate(id, name, price)?;
    candidate.price_text = product.price_text;
    candidate.attribute = product.attribute;
    candidate.image_url = product.image_url.or(product.thumbnail_url);
    Some(candidate)
}

/// Suggested products carry no attribute.
fn suggested_candidate(product: SuggestedProduct) -> Option<ProductCandidate> {
    let mut candidate = candidate(product.id, product.name, product.price)?;
    candidate.price_text = product.price_text;
    candidate.image_url = product.image_url.or(product.square_thumbnail_url);
    Some(candidate)
}

fn candidate(id: String, name: String, price: Decimal) -> Option<ProductCandidate> {
    let id = match ProductId::new(id) {
        Ok(id) => id,
        Err(err) => {
            tracing::warn!(error = %err, "skipping product with invalid id");
            return None;
        }
    };
    let unit_price = match UnitPrice::new(price) {
        Ok(price) => price,
        Err(err) => {
            tracing::warn!(product_id = %id, error = %err, "skipping product with invalid price");
            return None;
        }
    };
    Some(ProductCandidate::new(id, name, unit_price))
}
