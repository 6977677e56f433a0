//! Catalog records and fetch states.
//!
//! The catalog itself lives behind an HTTP API owned by the storefront
//! crate. This module only describes what comes back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Number of stars in a rating display.
pub const MAX_STARS: u8 = 5;

/// A product as supplied by the catalog. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub rating: Rating,
}

impl ProductRecord {
    #[must_use]
    pub fn display_price(&self) -> Price {
        Price::usd(self.price)
    }
}

/// Aggregate review score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average score on a 0-5 scale.
    pub rate: f64,
    /// Number of reviews.
    pub count: u32,
}

impl Rating {
    /// Number of filled stars: the average rounded to the nearest whole star.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=5
    pub fn filled_stars(&self) -> u8 {
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return 0;
        }
        self.rate.round().min(f64::from(MAX_STARS)) as u8
    }

    /// One flag per star, `true` when filled.
    #[must_use]
    pub fn stars(&self) -> Vec<bool> {
        let filled = self.filled_stars();
        (0..MAX_STARS).map(|i| i < filled).collect()
    }
}

/// Result of a single catalog fetch as seen by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// The request has not completed.
    Loading,
    /// The request completed with data.
    Ready(T),
    /// The request failed; the reason is safe to show to a shopper.
    Failed(String),
}

impl<T> FetchState<T> {
    /// Collapse a fetch result, turning the error into a display reason.
    pub fn from_result<E: core::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Ready(data),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Map the ready value, keeping loading and failure as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchState<U> {
        match self {
            Self::Loading => FetchState::Loading,
            Self::Ready(data) => FetchState::Ready(f(data)),
            Self::Failed(reason) => FetchState::Failed(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_stars_rounds_to_nearest() {
        assert_eq!(Rating { rate: 3.9, count: 1 }.filled_stars(), 4);
        assert_eq!(Rating { rate: 4.4, count: 1 }.filled_stars(), 4);
        assert_eq!(Rating { rate: 2.5, count: 1 }.filled_stars(), 3);
        assert_eq!(Rating { rate: 0.0, count: 0 }.filled_stars(), 0);
    }

    #[test]
    fn test_filled_stars_clamped() {
        assert_eq!(Rating { rate: 9.0, count: 1 }.filled_stars(), 5);
        assert_eq!(Rating { rate: -1.0, count: 1 }.filled_stars(), 0);
        assert_eq!(Rating { rate: f64::NAN, count: 1 }.filled_stars(), 0);
    }

    #[test]
    fn test_stars_vector() {
        let stars = Rating { rate: 2.1, count: 10 }.stars();
        assert_eq!(stars, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_fetch_state_from_result() {
        let ok: FetchState<u8> = FetchState::from_result::<&str>(Ok(3));
        assert_eq!(ok.data(), Some(&3));
        assert!(ok.error().is_none());

        let failed: FetchState<u8> = FetchState::from_result(Err("catalog unreachable"));
        assert_eq!(failed.error(), Some("catalog unreachable"));
        assert!(failed.data().is_none());
        assert!(!failed.is_loading());
    }

    #[test]
    fn test_fetch_state_map() {
        let state = FetchState::Ready(vec![1, 2, 3]).map(|v| v.len());
        assert_eq!(state, FetchState::Ready(3));
        assert!(FetchState::<u8>::Loading.map(u32::from).is_loading());
    }
}
