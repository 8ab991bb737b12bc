//! Shopping cart and theme preference values.

use crate::{ProductId, ProductSummary};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product identity key.
    pub id: ProductId,
    /// Display name at the time it was added.
    pub name: Box<str>,
    /// Primary brand, if known.
    #[serde(default)]
    pub brand: Option<Box<str>>,
    /// Image URL, if known.
    #[serde(default)]
    pub image_url: Option<Box<str>>,
    /// Quantity; always at least 1.
    pub quantity: u32,
}

impl CartItem {
    /// Build a single-quantity line from a product summary.
    #[must_use]
    pub fn from_product(product: &ProductSummary) -> Self {
        Self {
            id: product.id.clone(),
            name: product.display_name().into(),
            brand: product.primary_brand().map(Into::into),
            image_url: product.image_url.clone(),
            quantity: 1,
        }
    }
}

/// Ordered cart lines, unique by product id. Serialized as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Rebuild a cart from stored lines, merging duplicates and dropping empty lines.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::default();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match cart.position(&item.id) {
                Some(index) => {
                    if let Some(existing) = cart.items.get_mut(index) {
                        existing.quantity = existing.quantity.saturating_add(item.quantity);
                    }
                },
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns true when the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit; an existing line has its quantity incremented.
    pub fn add(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|line| line.id == item.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.items.push(CartItem { quantity: 1, ..item }),
        }
    }

    /// Remove a line; returns true when something was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| &line.id != id);
        self.items.len() != before
    }

    /// Set a line's quantity; zero or less removes the line.
    ///
    /// Returns false when no line has `id`.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.items.iter_mut().find(|line| &line.id == id) {
            Some(line) => {
                line.quantity = quantity;
                true
            },
            None => false,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.items.iter().position(|line| &line.id == id)
    }
}

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light scheme.
    #[default]
    Light,
    /// Dark scheme.
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when a theme name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "unknown theme `{}` (expected light or dark)", self.0)
    }
}

impl std::error::Error for UnknownTheme {}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(UnknownTheme(value.to_owned())),
        }
    }
}
