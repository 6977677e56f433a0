//! Product detail selection.
//!
//! ```text
//! Closed --select(id)--> Viewing(id)
//! Viewing(id) --select(id2)--> Viewing(id2)     (replace, never stack)
//! Viewing(id) --close--> Closed
//! ```
//!
//! Background scroll is locked exactly while a product is being viewed.
//! The lock is derived from the state on every render; nothing counts
//! opens and closes. Handlers log the [`CloseReason`]; the state does not
//! keep it.

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Which product, if any, is open in the detail view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "product_id", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Closed,
    Viewing(ProductId),
}

/// What a call to [`Selection::select`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// Nothing was open before.
    Opened,
    /// A different product was open and has been replaced.
    Replaced { previous: ProductId },
    /// The same product was already open.
    Unchanged,
}

/// Why the detail view closed, as reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The close control was pressed.
    Dismissed,
    /// A click landed outside the detail surface.
    OutsideClick,
    /// The escape key was pressed.
    Escape,
    /// The product was added to the cart from the detail view.
    AddedToCart,
}

impl CloseReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dismissed => "dismissed",
            Self::OutsideClick => "outside_click",
            Self::Escape => "escape",
            Self::AddedToCart => "added_to_cart",
        }
    }
}

impl Selection {
    /// Open `id` in the detail view, replacing whatever was open.
    pub fn select(&mut self, id: ProductId) -> SelectionChange {
        let change = match *self {
            Self::Closed => SelectionChange::Opened,
            Self::Viewing(current) if current == id => SelectionChange::Unchanged,
            Self::Viewing(previous) => SelectionChange::Replaced { previous },
        };
        *self = Self::Viewing(id);
        change
    }

    /// Close the detail view. Returns the product that was open, if any.
    pub fn close(&mut self) -> Option<ProductId> {
        let previous = self.active();
        *self = Self::Closed;
        previous
    }

    /// The product currently in view.
    #[must_use]
    pub const fn active(&self) -> Option<ProductId> {
        match *self {
            Self::Closed => None,
            Self::Viewing(id) => Some(id),
        }
    }

    #[must_use]
    pub const fn is_viewing(&self) -> bool {
        matches!(self, Self::Viewing(_))
    }

    /// Whether background scroll must be suspended.
    #[must_use]
    pub const fn scroll_locked(&self) -> bool {
        self.is_viewing()
    }
}
