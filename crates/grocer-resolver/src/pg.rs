//! Postgres-backed catalog: local candidate source, item store, and
//! permission checker over one pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grocer_core::{ShoppingItem, ShoppingList};
use grocer_db::{DbError, NewProductRow, ProductRow, ProductWithPrices};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{SourceError, StoreError};
use crate::sources::{BestPrice, LocalCandidateSource, LocalProduct, PricePoint};
use crate::store::{CatalogProduct, ItemStore, NewProduct, PermissionChecker};

#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<ProductRow> for CatalogProduct {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            barcode: row.barcode,
        }
    }
}

impl From<NewProduct> for NewProductRow {
    fn from(p: NewProduct) -> Self {
        Self {
            name: p.name,
            brand: p.brand,
            barcode: p.barcode,
            image_url: p.image_url,
            nutrition_grade: p.nutrition_grade,
            categories: p.categories,
        }
    }
}

fn to_local_product(hit: ProductWithPrices) -> LocalProduct {
    let average_price = hit.average_price();
    let best_price = hit.best_price().map(|p| BestPrice {
        amount: p.amount,
        store: p.store_name.clone(),
        location: p.store_location.clone(),
    });
    let prices = hit
        .prices
        .into_iter()
        .map(|p| PricePoint {
            amount: p.amount,
            currency: p.currency,
            store: p.store_name,
            date_recorded: p.date_recorded,
        })
        .collect();
    let product = hit.product;

    LocalProduct {
        id: product.id,
        name: product.name,
        brand: product.brand,
        barcode: Some(product.barcode),
        image_url: product.image_url,
        nutrition_grade: product.nutrition_grade,
        average_price,
        best_price,
        prices,
    }
}

#[async_trait]
impl LocalCandidateSource for PgCatalog {
    async fn search_by_name(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocalProduct>, SourceError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let hits = grocer_db::search_products_by_name(&self.pool, query, limit).await?;
        Ok(hits.into_iter().map(to_local_product).collect())
    }
}

#[async_trait]
impl ItemStore for PgCatalog {
    async fn get_item(&self, id: Uuid) -> Result<Option<ShoppingItem>, StoreError> {
        Ok(grocer_db::get_item(&self.pool, id).await?)
    }

    async fn get_list(&self, id: Uuid) -> Result<Option<ShoppingList>, StoreError> {
        Ok(grocer_db::get_list(&self.pool, id)
            .await?
            .map(ShoppingList::from))
    }

    async fn list_items(&self, list_id: Uuid) -> Result<Vec<ShoppingItem>, StoreError> {
        Ok(grocer_db::list_items_for_list(&self.pool, list_id).await?)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<CatalogProduct>, StoreError> {
        Ok(grocer_db::get_product(&self.pool, id)
            .await?
            .map(CatalogProduct::from))
    }

    async fn find_product_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<CatalogProduct>, StoreError> {
        Ok(grocer_db::find_product_by_barcode(&self.pool, barcode)
            .await?
            .map(CatalogProduct::from))
    }

    async fn create_product(&self, product: NewProduct) -> Result<CatalogProduct, StoreError> {
        let row = grocer_db::create_product(&self.pool, &NewProductRow::from(product)).await?;
        Ok(CatalogProduct::from(row))
    }

    async fn replace_item(
        &self,
        item: ShoppingItem,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<ShoppingItem, StoreError> {
        match grocer_db::replace_item(&self.pool, &item, expected_updated_at).await {
            Err(DbError::Stale) => Err(StoreError::Stale(item.id)),
            other => Ok(other?),
        }
    }
}

#[async_trait]
impl PermissionChecker for PgCatalog {
    async fn can_user_modify(&self, list_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(grocer_db::can_user_modify(&self.pool, list_id, user_id).await?)
    }
}
