//! Catalog wire format and conversion into core types.
//!
//! The API sends prices and ratings as JSON numbers. Prices go through the
//! shortest decimal representation of the float so `109.95` becomes exactly
//! `109.95` rather than the nearest binary fraction.

use std::str::FromStr;

use quickkart_core::{ProductId, ProductRecord, Rating};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::CatalogError;

/// Product as returned by the catalog API.
#[derive(Debug, Deserialize)]
pub(super) struct Product {
    id: u32,
    title: String,
    price: f64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    image: String,
    #[serde(default)]
    rating: Option<ProductRating>,
}

#[derive(Debug, Deserialize)]
struct ProductRating {
    rate: f64,
    count: u32,
}

impl TryFrom<Product> for ProductRecord {
    type Error = CatalogError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        let price = decimal_from_f64(product.price).ok_or_else(|| CatalogError::InvalidProduct {
            id: product.id,
            reason: format!("unrepresentable price {}", product.price),
        })?;
        if price < Decimal::ZERO {
            return Err(CatalogError::InvalidProduct {
                id: product.id,
                reason: format!("negative price {price}"),
            });
        }

        let rating = product.rating.map_or(
            Rating {
                rate: 0.0,
                count: 0,
            },
            |r| Rating {
                rate: r.rate,
                count: r.count,
            },
        );

        Ok(Self {
            id: ProductId::new(product.id),
            title: product.title,
            price,
            description: product.description,
            category: product.category,
            image_url: product.image,
            rating,
        })
    }
}

/// Convert a JSON float to a decimal via its shortest round-trip text.
fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BACKPACK: &str = r#"{
        "id": 1,
        "title": "Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops",
        "price": 109.95,
        "description": "Your perfect pack for everyday use and walks in the forest.",
        "category": "men's clothing",
        "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
        "rating": { "rate": 3.9, "count": 120 }
    }"#;

    #[test]
    fn test_convert_product() {
        let wire: Product = serde_json::from_str(BACKPACK).unwrap();
        let record = ProductRecord::try_from(wire).unwrap();

        assert_eq!(record.id, ProductId::new(1));
        assert_eq!(record.price, Decimal::new(10995, 2));
        assert_eq!(record.category, "men's clothing");
        assert_eq!(record.rating.count, 120);
        assert_eq!(record.display_price().display(), "$109.95");
    }

    #[test]
    fn test_integer_price() {
        let wire: Product =
            serde_json::from_str(r#"{"id":2,"title":"Ring","price":168,"image":"x.jpg"}"#)
                .unwrap();
        let record = ProductRecord::try_from(wire).unwrap();
        assert_eq!(record.price, Decimal::new(168, 0));
        assert_eq!(record.rating.count, 0);
        assert!(record.description.is_empty());
    }

    #[test]
    fn test_negative_price_rejected() {
        let wire: Product =
            serde_json::from_str(r#"{"id":3,"title":"Bad","price":-1.5,"image":"x.jpg"}"#)
                .unwrap();
        let err = ProductRecord::try_from(wire).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidProduct { id: 3, .. }));
    }

    #[test]
    fn test_decimal_from_f64_is_exact_for_prices() {
        assert_eq!(decimal_from_f64(22.3), Some(Decimal::new(223, 1)));
        assert_eq!(decimal_from_f64(0.1), Some(Decimal::new(1, 1)));
        assert_eq!(decimal_from_f64(f64::NAN), None);
        assert_eq!(decimal_from_f64(f64::INFINITY), None);
    }
}
