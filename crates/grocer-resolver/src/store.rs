//! Persistence and authorization seams used by the conversion engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grocer_core::{ShoppingItem, ShoppingList};
use uuid::Uuid;

use crate::error::StoreError;
use crate::sources::ExternalProduct;

/// Prefix of barcodes synthesized for products that have no real one.
pub const PLACEHOLDER_BARCODE_PREFIX: &str = "custom-";

/// Returns a fresh `custom-<uuid>` barcode.
#[must_use]
pub fn placeholder_barcode() -> String {
    format!("{PLACEHOLDER_BARCODE_PREFIX}{}", Uuid::new_v4().simple())
}

/// The fields of a canonical product the engine reads back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProduct {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub barcode: String,
}

/// Payload for canonical product creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub brand: Option<String>,
    pub barcode: String,
    pub image_url: Option<String>,
    pub nutrition_grade: Option<String>,
    pub categories: Vec<String>,
}

impl NewProduct {
    /// A bare product carrying only a name, an optional brand, and either the
    /// given barcode or a synthesized placeholder.
    #[must_use]
    pub fn placeholder(name: &str, brand: Option<String>, barcode: Option<String>) -> Self {
        Self {
            name: name.trim().to_owned(),
            brand,
            barcode: barcode.unwrap_or_else(placeholder_barcode),
            image_url: None,
            nutrition_grade: None,
            categories: Vec::new(),
        }
    }

    /// Copies the external record's metadata, keeping its real barcode.
    #[must_use]
    pub fn from_external(product: &ExternalProduct) -> Self {
        Self {
            name: product.name.trim().to_owned(),
            brand: product.brand.clone(),
            barcode: product.barcode.clone(),
            image_url: product.image_url.clone(),
            nutrition_grade: product.nutrition_grade.clone(),
            categories: product.categories.clone(),
        }
    }
}

/// Storage for shopping items and canonical products.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get_item(&self, id: Uuid) -> Result<Option<ShoppingItem>, StoreError>;

    async fn get_list(&self, id: Uuid) -> Result<Option<ShoppingList>, StoreError>;

    async fn list_items(&self, list_id: Uuid) -> Result<Vec<ShoppingItem>, StoreError>;

    async fn get_product(&self, id: Uuid) -> Result<Option<CatalogProduct>, StoreError>;

    async fn find_product_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<CatalogProduct>, StoreError>;

    /// Creates the product, or returns the existing one with the same barcode.
    async fn create_product(&self, product: NewProduct) -> Result<CatalogProduct, StoreError>;

    /// Swaps the stored item with the same id for `item`, atomically, as long
    /// as the stored `updated_at` still equals `expected_updated_at`.
    /// Otherwise nothing is written and [`StoreError::Stale`] is returned.
    async fn replace_item(
        &self,
        item: ShoppingItem,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<ShoppingItem, StoreError>;
}

/// Answers whether a user may edit a list's items.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn can_user_modify(&self, list_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
}
