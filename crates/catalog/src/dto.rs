//! Wire shapes of the product API.
//!
//! Field names follow the JSON exactly (`imageURL`, not `imageUrl`), hence the
//! explicit renames.

use rust_decimal::Decimal;
use serde::Deserialize;

/// One entry of `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub id: Option<String>,
    pub name: Option<String>,
    pub product_count: Option<u32>,
    #[serde(default)]
    pub products: Vec<ListedProduct>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedProduct {
    pub id: Option<String>,
    pub name: Option<String>,
    pub attribute: Option<String>,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
    pub price_text: Option<String>,
    pub short_description: Option<String>,
}

/// One entry of `GET /suggestedProducts`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedProductList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub products: Vec<SuggestedProduct>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedProduct {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub price_text: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    #[serde(rename = "squareThumbnailURL")]
    pub square_thumbnail_url: Option<String>,
    pub short_description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<Decimal>,
    pub status: Option<i32>,
}
