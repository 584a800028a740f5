use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::units::Unit;

/// Names shorter than this are never offered for resolution.
pub const MIN_RESOLVABLE_NAME_CHARS: usize = 3;

/// Returns `true` when `name` is long enough to be worth matching against
/// the catalog (more than 2 characters after trimming).
#[must_use]
pub fn is_resolvable_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_RESOLVABLE_NAME_CHARS
}

/// The authenticated caller of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
}

/// A shopping list; only the fields the resolution engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
}

/// Where an item sits in the resolution workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Free text with no product reference.
    Unresolved,
    /// Suggestions were computed for the caller; nothing is persisted.
    Suggested,
    /// Bound to a canonical product. Terminal.
    Resolved,
    /// The caller dismissed the suggestions. Terminal for the request.
    Unconverted,
}

/// One entry of a shopping list.
///
/// Values are treated as immutable: changes go through the `with_*` methods,
/// which return a rebuilt item that storage then swaps in for the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: Uuid,
    pub list_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit: Unit,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    /// Barcode typed or scanned by the user, used for exact external lookup.
    pub barcode: Option<String>,
    /// Canonical product this item is bound to, once resolved.
    pub product_id: Option<Uuid>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShoppingItem {
    /// Returns `Resolved` when a product is bound, `Unresolved` otherwise.
    #[must_use]
    pub fn state(&self) -> ItemState {
        if self.product_id.is_some() {
            ItemState::Resolved
        } else {
            ItemState::Unresolved
        }
    }

    /// Completed, unbound, and carrying a name worth resolving.
    #[must_use]
    pub fn is_conversion_opportunity(&self) -> bool {
        self.is_completed && self.product_id.is_none() && is_resolvable_name(&self.name)
    }

    /// Rebuilds the item bound to `product_id`.
    ///
    /// Quantity, unit, price, notes and every other field carry over
    /// unchanged; only the product reference and `updated_at` differ.
    #[must_use]
    pub fn with_product(&self, product_id: Uuid) -> Self {
        Self {
            product_id: Some(product_id),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_completed(&self, is_completed: bool) -> Self {
        Self {
            is_completed,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_item(name: &str, is_completed: bool, product_id: Option<Uuid>) -> ShoppingItem {
        let now = Utc::now();
        ShoppingItem {
            id: Uuid::new_v4(),
            list_id: Uuid::new_v4(),
            name: name.to_string(),
            quantity: Decimal::new(2, 0),
            unit: Unit::Kg,
            price: Some(Decimal::new(299, 2)),
            notes: Some("the cheap one".to_string()),
            barcode: None,
            product_id,
            is_completed,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn resolvable_name_requires_more_than_two_chars() {
        assert!(!is_resolvable_name(""));
        assert!(!is_resolvable_name("  ab  "));
        assert!(is_resolvable_name("tea"));
        assert!(is_resolvable_name("pão"));
    }

    #[test]
    fn with_product_preserves_item_fields() {
        let item = make_item("rice", false, None);
        let product_id = Uuid::new_v4();
        let rebound = item.with_product(product_id);

        assert_eq!(rebound.product_id, Some(product_id));
        assert_eq!(rebound.id, item.id);
        assert_eq!(rebound.list_id, item.list_id);
        assert_eq!(rebound.name, item.name);
        assert_eq!(rebound.quantity, item.quantity);
        assert_eq!(rebound.unit, item.unit);
        assert_eq!(rebound.price, item.price);
        assert_eq!(rebound.notes, item.notes);
        assert_eq!(rebound.created_at, item.created_at);
        assert!(item.product_id.is_none(), "original must be untouched");
    }

    #[test]
    fn state_reflects_product_binding() {
        let item = make_item("rice", false, None);
        assert_eq!(item.state(), ItemState::Unresolved);
        assert_eq!(item.with_product(Uuid::new_v4()).state(), ItemState::Resolved);
    }

    #[test]
    fn conversion_opportunity_rules() {
        assert!(make_item("rice", true, None).is_conversion_opportunity());
        assert!(!make_item("rice", false, None).is_conversion_opportunity());
        assert!(!make_item("rice", true, Some(Uuid::new_v4())).is_conversion_opportunity());
        assert!(!make_item("ok", true, None).is_conversion_opportunity());
    }

    #[test]
    fn with_completed_returns_new_value() {
        let item = make_item("rice", false, None);
        let done = item.with_completed(true);
        assert!(done.is_completed);
        assert!(!item.is_completed);
        assert_eq!(done.id, item.id);
    }
}
