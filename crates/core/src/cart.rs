//! Session cart.
//!
//! A [`CartStore`] is an ordered list of [`CartLineItem`]s. Lines are keyed by
//! [`LineKey`] - the product plus its optional variant (e.g. a size) - and
//! adding a line whose key is already present merges the quantities instead
//! of appending a duplicate.
//!
//! # Invariants
//!
//! - No two lines share a [`LineKey`].
//! - Every line has a quantity of at least one. [`Quantity`] cannot hold zero,
//!   and [`CartStore::set_quantity`] removes the line when asked for zero.
//! - Insertion order is display order; merging never moves a line.
//!
//! Totals are recomputed from the lines on every call, so they can never
//! drift from the cart contents.

use core::fmt;
use core::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::ProductRecord;
use crate::types::{Price, ProductId};

/// Errors raised at the cart boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// A caller asked for a line with zero items.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),
}

/// Number of units on a cart line. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `value` is zero.
    pub const fn new(value: u32) -> Result<Self, CartError> {
        match NonZeroU32::new(value) {
            Some(n) => Ok(Self(n)),
            None => Err(CartError::InvalidQuantity(value)),
        }
    }

    /// Resolve an optional caller-supplied quantity, defaulting to one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `value` is `Some(0)`.
    pub fn or_default(value: Option<u32>) -> Result<Self, CartError> {
        value.map_or(Ok(Self::ONE), Self::new)
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = CartError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a cart line: product plus optional variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub variant: Option<String>,
}

impl LineKey {
    /// Create a key. Blank variants are treated as no variant.
    #[must_use]
    pub fn new(product_id: ProductId, variant: Option<&str>) -> Self {
        Self {
            product_id,
            variant: normalize_variant(variant),
        }
    }
}

/// Trim a variant label and drop it entirely if nothing is left.
fn normalize_variant(variant: Option<&str>) -> Option<String> {
    variant
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// One distinct product + variant in the cart.
///
/// Title, price and image are copied from the catalog when the line is
/// created; later catalog changes do not alter an existing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Decimal,
    pub image_url: String,
    pub quantity: Quantity,
    pub variant: Option<String>,
}

impl CartLineItem {
    /// Build a line from a catalog record.
    #[must_use]
    pub fn from_product(product: &ProductRecord, quantity: Quantity, variant: Option<&str>) -> Self {
        Self {
            product_id: product.id,
            title: product.title.clone(),
            unit_price: product.price,
            image_url: product.image_url.clone(),
            quantity,
            variant: normalize_variant(variant),
        }
    }

    /// The key used to decide whether two lines merge.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id,
            variant: self.variant.clone(),
        }
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.variant == key.variant
    }

    /// `unit_price * quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity.get())
    }

    /// Unit price for display.
    #[must_use]
    pub fn unit_price_display(&self) -> Price {
        Price::usd(self.unit_price)
    }
}

/// What [`CartStore::add_item`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// A new line was appended.
    Added,
    /// An existing line absorbed the quantity.
    Merged {
        /// Quantity before the merge.
        previous: Quantity,
        /// Quantity after the merge.
        current: Quantity,
    },
}

/// Ordered collection of cart lines for one browsing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartStore {
    items: Vec<CartLineItem>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a line, merging with an existing line that has the same key.
    pub fn add_item(&mut self, mut item: CartLineItem) -> LineChange {
        item.variant = normalize_variant(item.variant.as_deref());
        let key = item.key();

        if let Some(existing) = self.items.iter_mut().find(|line| line.matches(&key)) {
            let previous = existing.quantity;
            existing.quantity = previous.saturating_add(item.quantity);
            return LineChange::Merged {
                previous,
                current: existing.quantity,
            };
        }

        self.items.push(item);
        LineChange::Added
    }

    /// Remove the line for `product_id` / `variant`. Absent lines are a no-op.
    pub fn remove_item(
        &mut self,
        product_id: ProductId,
        variant: Option<&str>,
    ) -> Option<CartLineItem> {
        let key = LineKey::new(product_id, variant);
        let index = self.items.iter().position(|line| line.matches(&key))?;
        Some(self.items.remove(index))
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// Returns `false` if no line has `key`.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> bool {
        let Some(index) = self.items.iter().position(|line| line.matches(key)) else {
            return false;
        };

        match Quantity::new(quantity) {
            Ok(quantity) => {
                if let Some(line) = self.items.get_mut(index) {
                    line.quantity = quantity;
                }
            }
            Err(_) => {
                self.items.remove(index);
            }
        }
        true
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up a line by key.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.matches(key))
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of `unit_price * quantity` across all lines, unrounded.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: u32, price: Decimal, quantity: u32, variant: Option<&str>) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(id),
            title: format!("Product {id}"),
            unit_price: price,
            image_url: format!("https://img.example/{id}.jpg"),
            quantity: Quantity::new(quantity).unwrap(),
            variant: variant.map(str::to_owned),
        }
    }

    fn mug(quantity: u32) -> CartLineItem {
        CartLineItem {
            title: "Mug".to_string(),
            ..line(1, Decimal::new(999, 2), quantity, None)
        }
    }

    #[test]
    fn test_quantity_rejects_zero() {
        assert_eq!(Quantity::new(0), Err(CartError::InvalidQuantity(0)));
        assert_eq!(Quantity::or_default(Some(0)), Err(CartError::InvalidQuantity(0)));
        assert_eq!(Quantity::or_default(None).unwrap(), Quantity::ONE);
        assert_eq!(Quantity::or_default(Some(4)).unwrap().get(), 4);
    }

    #[test]
    fn test_quantity_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("2").unwrap().get(), 2);
    }

    #[test]
    fn test_same_key_merges_into_one_line() {
        let mut cart = CartStore::new();
        assert_eq!(cart.add_item(line(1, Decimal::ONE, 2, Some("M"))), LineChange::Added);
        let change = cart.add_item(line(1, Decimal::ONE, 3, Some("M")));

        assert_eq!(
            change,
            LineChange::Merged {
                previous: Quantity::new(2).unwrap(),
                current: Quantity::new(5).unwrap(),
            }
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity.get(), 5);
    }

    #[test]
    fn test_different_variants_stay_distinct() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, Decimal::ONE, 1, Some("S")));
        cart.add_item(line(1, Decimal::ONE, 1, Some("XL")));
        cart.add_item(line(1, Decimal::ONE, 1, None));

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.total_item_count(), 3);
    }

    #[test]
    fn test_blank_variant_matches_absent_variant() {
        let mut cart = CartStore::new();
        cart.add_item(line(4, Decimal::ONE, 1, None));
        cart.add_item(line(4, Decimal::ONE, 1, Some("  ")));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity.get(), 2);
    }

    #[test]
    fn test_merge_keeps_insertion_order() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, Decimal::ONE, 1, None));
        cart.add_item(line(2, Decimal::ONE, 1, None));
        cart.add_item(line(1, Decimal::ONE, 1, None));

        let ids: Vec<u32> = cart.items().iter().map(|l| l.product_id.as_u32()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_remove_missing_line_is_noop() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, Decimal::ONE, 1, Some("M")));
        let before = cart.clone();

        assert!(cart.remove_item(ProductId::new(1), Some("L")).is_none());
        assert!(cart.remove_item(ProductId::new(9), None).is_none());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_only_matching_variant() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, Decimal::ONE, 1, Some("S")));
        cart.add_item(line(1, Decimal::ONE, 1, Some("M")));

        let removed = cart.remove_item(ProductId::new(1), Some("S")).unwrap();
        assert_eq!(removed.variant.as_deref(), Some("S"));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].variant.as_deref(), Some("M"));
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = CartStore::new();
        cart.add_item(line(2, Decimal::ONE, 3, None));
        let key = LineKey::new(ProductId::new(2), None);

        assert!(cart.set_quantity(&key, 1));
        assert_eq!(cart.get(&key).unwrap().quantity.get(), 1);
        assert!(cart.set_quantity(&key, 0));
        assert!(cart.is_empty());
        assert!(!cart.set_quantity(&key, 4));
    }

    #[test]
    fn test_totals_follow_every_mutation() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, Decimal::new(1050, 2), 2, None));
        cart.add_item(line(2, Decimal::new(333, 2), 3, Some("L")));
        assert_eq!(cart.total_item_count(), 5);
        assert_eq!(cart.total_price(), Decimal::new(3099, 2));

        cart.remove_item(ProductId::new(1), None);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.total_price(), Decimal::new(999, 2));

        cart.clear();
        assert_eq!(cart.total_item_count(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_mug_scenario() {
        let mut cart = CartStore::new();

        cart.add_item(mug(1));
        assert_eq!(cart.total_item_count(), 1);
        assert_eq!(cart.total_price(), Decimal::new(999, 2));

        cart.add_item(mug(2));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.total_price(), Decimal::new(2997, 2));
        assert_eq!(Price::usd(cart.total_price()).display(), "$29.97");

        cart.remove_item(ProductId::new(1), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_copied_from_product() {
        let product = ProductRecord {
            id: ProductId::new(8),
            title: "Backpack".to_string(),
            price: Decimal::new(10995, 2),
            description: String::new(),
            category: "bags".to_string(),
            image_url: "https://img.example/8.jpg".to_string(),
            rating: crate::catalog::Rating {
                rate: 3.9,
                count: 120,
            },
        };
        let item = CartLineItem::from_product(&product, Quantity::new(2).unwrap(), Some(" L "));

        assert_eq!(item.title, "Backpack");
        assert_eq!(item.variant.as_deref(), Some("L"));
        assert_eq!(item.line_total(), Decimal::new(21990, 2));
        assert_eq!(item.unit_price_display().display(), "$109.95");
    }

    #[test]
    fn test_cart_survives_session_serialization() {
        let mut cart = CartStore::new();
        cart.add_item(line(3, Decimal::new(2250, 2), 2, Some("S")));

        let json = serde_json::to_value(&cart).unwrap();
        let back: CartStore = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
