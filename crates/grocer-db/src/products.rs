//! Database operations for `products`, `prices`, and `stores`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Most recent price rows kept per product in search results.
const PRICE_HISTORY_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    /// Real EAN/UPC or a synthesized `custom-...` placeholder.
    pub barcode: String,
    pub image_url: Option<String>,
    pub nutrition_grade: Option<String>,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from `prices` joined with its store.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceRow {
    pub product_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub store_name: String,
    pub store_location: Option<String>,
    pub date_recorded: DateTime<Utc>,
}

/// A product together with its most recent recorded prices, newest first.
#[derive(Debug, Clone)]
pub struct ProductWithPrices {
    pub product: ProductRow,
    pub prices: Vec<PriceRow>,
}

impl ProductWithPrices {
    /// Currency of the newest price. Aggregates only cover prices in it.
    #[must_use]
    pub fn reference_currency(&self) -> Option<&str> {
        self.prices.first().map(|p| p.currency.as_str())
    }

    fn comparable_prices(&self) -> impl Iterator<Item = &PriceRow> {
        let currency = self.reference_currency();
        self.prices
            .iter()
            .filter(move |p| Some(p.currency.as_str()) == currency)
    }

    /// Mean of the prices in [`Self::reference_currency`], rounded to cents.
    /// `None` without prices.
    #[must_use]
    pub fn average_price(&self) -> Option<Decimal> {
        let (total, count) = self
            .comparable_prices()
            .fold((Decimal::ZERO, 0u32), |(sum, n), p| (sum + p.amount, n + 1));
        (count > 0).then(|| (total / Decimal::from(count)).round_dp(2))
    }

    /// Cheapest price in [`Self::reference_currency`]; the most recent one
    /// wins ties.
    #[must_use]
    pub fn best_price(&self) -> Option<&PriceRow> {
        self.comparable_prices()
            .reduce(|best, p| if p.amount < best.amount { p } else { best })
    }
}

/// Insert payload for a new canonical product.
#[derive(Debug, Clone)]
pub struct NewProductRow {
    pub name: String,
    pub brand: Option<String>,
    pub barcode: String,
    pub image_url: Option<String>,
    pub nutrition_grade: Option<String>,
    pub categories: Vec<String>,
}

// ---------------------------------------------------------------------------
// products operations
// ---------------------------------------------------------------------------

/// Searches products whose name contains `query` (case-insensitive) and
/// attaches up to 10 most recent prices to each.
///
/// Results are ordered by name and capped at `limit`. A blank query returns
/// nothing.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn search_products_by_name(
    pool: &PgPool,
    query: &str,
    limit: i64,
) -> Result<Vec<ProductWithPrices>, DbError> {
    let query = query.trim();
    if query.is_empty() || limit <= 0 {
        return Ok(Vec::new());
    }
    let pattern = format!("%{}%", escape_like(query));

    let products = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, brand, barcode, image_url, nutrition_grade, categories, \
                created_at, updated_at \
         FROM products \
         WHERE name ILIKE $1 ESCAPE '\\' \
         ORDER BY lower(name), id \
         LIMIT $2",
    )
    .bind(&pattern)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    if products.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let prices = sqlx::query_as::<_, PriceRow>(
        "SELECT pr.product_id, pr.amount, pr.currency, \
                s.name AS store_name, s.location AS store_location, pr.date_recorded \
         FROM prices pr \
         JOIN stores s ON s.id = pr.store_id \
         WHERE pr.product_id = ANY($1) \
         ORDER BY pr.date_recorded DESC, pr.id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_product: HashMap<Uuid, Vec<PriceRow>> = HashMap::new();
    for price in prices {
        let entry = by_product.entry(price.product_id).or_default();
        if entry.len() < PRICE_HISTORY_LIMIT {
            entry.push(price);
        }
    }

    Ok(products
        .into_iter()
        .map(|product| {
            let prices = by_product.remove(&product.id).unwrap_or_default();
            ProductWithPrices { product, prices }
        })
        .collect())
}

/// Returns the product with the given id, if it exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, id: Uuid) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, brand, barcode, image_url, nutrition_grade, categories, \
                created_at, updated_at \
         FROM products \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the product carrying `barcode`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_product_by_barcode(
    pool: &PgPool,
    barcode: &str,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, brand, barcode, image_url, nutrition_grade, categories, \
                created_at, updated_at \
         FROM products \
         WHERE barcode = $1",
    )
    .bind(barcode)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a canonical product.
///
/// Barcodes are unique: inserting a barcode that already exists returns the
/// existing row unchanged, so repeated creation requests converge on one
/// product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_product(pool: &PgPool, product: &NewProductRow) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products \
             (name, brand, barcode, image_url, nutrition_grade, categories) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (barcode) DO UPDATE SET barcode = products.barcode \
         RETURNING id, name, brand, barcode, image_url, nutrition_grade, categories, \
                   created_at, updated_at",
    )
    .bind(&product.name)
    .bind(&product.brand)
    .bind(&product.barcode)
    .bind(&product.image_url)
    .bind(&product.nutrition_grade)
    .bind(&product.categories)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Escapes `LIKE` metacharacters so user text matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(amount: Decimal, store: &str) -> PriceRow {
        price_in(amount, store, "EUR")
    }

    fn price_in(amount: Decimal, store: &str, currency: &str) -> PriceRow {
        PriceRow {
            product_id: Uuid::nil(),
            amount,
            currency: currency.to_string(),
            store_name: store.to_string(),
            store_location: None,
            date_recorded: Utc::now(),
        }
    }

    fn product_with(prices: Vec<PriceRow>) -> ProductWithPrices {
        let now = Utc::now();
        ProductWithPrices {
            product: ProductRow {
                id: Uuid::nil(),
                name: "Basmati rice".to_string(),
                brand: None,
                barcode: "123".to_string(),
                image_url: None,
                nutrition_grade: None,
                categories: vec![],
                created_at: now,
                updated_at: now,
            },
            prices,
        }
    }

    #[test]
    fn escape_like_escapes_metacharacters() {
        assert_eq!(escape_like("100%_rice\\"), "100\\%\\_rice\\\\");
        assert_eq!(escape_like("milk"), "milk");
    }

    #[test]
    fn average_and_best_price_are_none_without_prices() {
        let p = product_with(vec![]);
        assert!(p.average_price().is_none());
        assert!(p.best_price().is_none());
    }

    #[test]
    fn average_price_rounds_to_cents() {
        let p = product_with(vec![
            price(Decimal::new(100, 2), "A"),
            price(Decimal::new(200, 2), "B"),
            price(Decimal::new(200, 2), "C"),
        ]);
        assert_eq!(p.average_price(), Some(Decimal::new(167, 2)));
    }

    #[test]
    fn best_price_picks_cheapest_and_keeps_first_on_ties() {
        let p = product_with(vec![
            price(Decimal::new(250, 2), "Newest"),
            price(Decimal::new(199, 2), "Cheap recent"),
            price(Decimal::new(199, 2), "Cheap old"),
        ]);
        assert_eq!(p.best_price().unwrap().store_name, "Cheap recent");
    }

    #[test]
    fn aggregates_ignore_prices_in_other_currencies() {
        let p = product_with(vec![
            price_in(Decimal::new(300, 2), "Paris", "EUR"),
            price_in(Decimal::new(50, 2), "Lagos", "USD"),
            price_in(Decimal::new(200, 2), "Lyon", "EUR"),
        ]);
        assert_eq!(p.reference_currency(), Some("EUR"));
        assert_eq!(p.average_price(), Some(Decimal::new(250, 2)));
        assert_eq!(p.best_price().unwrap().store_name, "Lyon");
    }
}
