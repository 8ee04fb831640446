//! Cart line items and the transient candidates they are built from.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::ProductId;
use crate::value_object::{Quantity, UnitPrice};

/// A product currently in the cart.
///
/// A line item always holds a quantity of at least one; reaching zero means
/// the item must be removed instead of stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineItem {
    id: ProductId,
    name: String,
    unit_price: UnitPrice,
    attribute: Option<String>,
    image_url: Option<String>,
    quantity: Quantity,
}

impl CartLineItem {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        unit_price: UnitPrice,
        quantity: Quantity,
    ) -> DomainResult<Self> {
        ensure_positive(&id, quantity)?;
        Ok(Self {
            id,
            name: name.into(),
            unit_price,
            attribute: None,
            image_url: None,
            quantity,
        })
    }

    pub fn with_attribute(mut self, attribute: Option<String>) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    /// Same item with a different quantity. Zero is rejected.
    pub fn with_quantity(mut self, quantity: Quantity) -> DomainResult<Self> {
        ensure_positive(&self.id, quantity)?;
        self.quantity = quantity;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> UnitPrice {
        self.unit_price
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// `unit price × quantity`, unrounded.
    pub fn line_total(&self) -> DomainResult<rust_decimal::Decimal> {
        self.unit_price.line_total(self.quantity)
    }
}

impl Entity for CartLineItem {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn ensure_positive(id: &ProductId, quantity: Quantity) -> DomainResult<()> {
    if quantity.is_zero() {
        return Err(DomainError::invariant(format!(
            "line item '{id}' cannot be stored with quantity 0"
        )));
    }
    Ok(())
}

/// A product being considered for the cart (catalog cell or detail screen).
///
/// Candidates are never persisted. `quantity` is what the caller wants to
/// start with; zero (the default) means "one unit".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCandidate {
    pub id: ProductId,
    pub name: String,
    pub unit_price: UnitPrice,
    /// Display text for the price as sent by the catalog (e.g. `"₺12,50"`).
    #[serde(default)]
    pub price_text: Option<String>,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub quantity: Quantity,
}

impl ProductCandidate {
    pub fn new(id: ProductId, name: impl Into<String>, unit_price: UnitPrice) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            price_text: None,
            attribute: None,
            image_url: None,
            quantity: Quantity::ZERO,
        }
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Quantity a first add should persist: the embedded one, or one unit.
    pub fn initial_quantity(&self) -> Quantity {
        if self.quantity.is_zero() {
            Quantity::ONE
        } else {
            self.quantity
        }
    }

    /// Build the line item stored on first add.
    pub fn into_line_item(self) -> CartLineItem {
        let quantity = self.initial_quantity();
        CartLineItem {
            id: self.id,
            name: self.name,
            unit_price: self.unit_price,
            attribute: self.attribute,
            image_url: self.image_url,
            quantity,
        }
    }
}

impl Entity for ProductCandidate {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Back-conversion used when a cart row is opened on the detail screen.
impl From<&CartLineItem> for ProductCandidate {
    fn from(item: &CartLineItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.unit_price,
            price_text: None,
            attribute: item.attribute.clone(),
            image_url: item.image_url.clone(),
            quantity: item.quantity,
        }
    }
}
