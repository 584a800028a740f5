//! Database operations for `shopping_lists` and `list_collaborators`.

use chrono::{DateTime, Utc};
use grocer_core::ShoppingList;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `shopping_lists` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ListRow> for ShoppingList {
    fn from(row: ListRow) -> Self {
        ShoppingList {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
        }
    }
}

/// Returns the list with the given id, if it exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_list(pool: &PgPool, id: Uuid) -> Result<Option<ListRow>, DbError> {
    let row = sqlx::query_as::<_, ListRow>(
        "SELECT id, owner_id, name, created_at, updated_at \
         FROM shopping_lists \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns `true` when `user_id` may edit items of `list_id`: the list
/// owner, or a collaborator with the `editor` or `admin` role.
///
/// A missing list yields `false`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn can_user_modify(pool: &PgPool, list_id: Uuid, user_id: Uuid) -> Result<bool, DbError> {
    let allowed: bool = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS ( \
             SELECT 1 FROM shopping_lists WHERE id = $1 AND owner_id = $2 \
         ) OR EXISTS ( \
             SELECT 1 FROM list_collaborators \
             WHERE list_id = $1 AND user_id = $2 AND role IN ('editor', 'admin') \
         )",
    )
    .bind(list_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(allowed)
}
