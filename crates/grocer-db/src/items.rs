//! Database operations for `list_items`.

use chrono::{DateTime, Utc};
use grocer_core::{ShoppingItem, Unit};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const ITEM_COLUMNS: &str = "id, list_id, name, quantity, unit, price, notes, barcode, \
product_id, is_completed, created_at, updated_at";

/// A row from the `list_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    pub id: Uuid,
    pub list_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    pub barcode: Option<String>,
    pub product_id: Option<Uuid>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for ShoppingItem {
    type Error = DbError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let unit: Unit = row
            .unit
            .parse()
            .map_err(|reason| DbError::InvalidColumn {
                column: "list_items.unit",
                reason,
            })?;

        Ok(ShoppingItem {
            id: row.id,
            list_id: row.list_id,
            name: row.name,
            quantity: row.quantity,
            unit,
            price: row.price,
            notes: row.notes,
            barcode: row.barcode,
            product_id: row.product_id,
            is_completed: row.is_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Returns the item with the given id, if it exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or
/// [`DbError::InvalidColumn`] if the stored unit is not recognised.
pub async fn get_item(pool: &PgPool, id: Uuid) -> Result<Option<ShoppingItem>, DbError> {
    let row = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM list_items WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(ShoppingItem::try_from).transpose()
}

/// Returns every item of a list, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or
/// [`DbError::InvalidColumn`] if any stored unit is not recognised.
pub async fn list_items_for_list(
    pool: &PgPool,
    list_id: Uuid,
) -> Result<Vec<ShoppingItem>, DbError> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM list_items \
         WHERE list_id = $1 \
         ORDER BY created_at, id"
    ))
    .bind(list_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ShoppingItem::try_from).collect()
}

/// Swaps the stored row for `item` in one transaction, provided the row has
/// not been written since it was read.
///
/// The row is locked and its `updated_at` compared with
/// `expected_updated_at`; a mismatch aborts without writing. Every mutable
/// column is written from `item`; `id`, `list_id` and `created_at` are kept.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `item.id`, [`DbError::Stale`]
/// if the row changed after `expected_updated_at`, [`DbError::Sqlx`] on
/// query failure.
pub async fn replace_item(
    pool: &PgPool,
    item: &ShoppingItem,
    expected_updated_at: DateTime<Utc>,
) -> Result<ShoppingItem, DbError> {
    let mut tx = pool.begin().await?;

    let current: Option<DateTime<Utc>> = sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT updated_at FROM list_items WHERE id = $1 FOR UPDATE",
    )
    .bind(item.id)
    .fetch_optional(&mut *tx)
    .await?;
    match current {
        None => return Err(DbError::NotFound),
        Some(updated_at) if updated_at != expected_updated_at => {
            tracing::debug!(item_id = %item.id, "list item changed concurrently");
            return Err(DbError::Stale);
        }
        Some(_) => {}
    }

    let row = sqlx::query_as::<_, ItemRow>(&format!(
        "UPDATE list_items SET \
             name = $2, quantity = $3, unit = $4, price = $5, notes = $6, \
             barcode = $7, product_id = $8, is_completed = $9, updated_at = $10 \
         WHERE id = $1 \
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(item.id)
    .bind(&item.name)
    .bind(item.quantity)
    .bind(item.unit.as_str())
    .bind(item.price)
    .bind(&item.notes)
    .bind(&item.barcode)
    .bind(item.product_id)
    .bind(item.is_completed)
    .bind(item.updated_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::debug!(item_id = %item.id, product_id = ?item.product_id, "list item replaced");
    ShoppingItem::try_from(row)
}
