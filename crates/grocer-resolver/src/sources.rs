//! Candidate source seams: the local catalog and the external product
//! database, plus the Open Food Facts implementation of the latter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grocer_openfood::{OffProduct, OpenFoodClient};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::SourceError;

/// Cheapest recorded price of a product and where it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestPrice {
    pub amount: Decimal,
    pub store: String,
    pub location: Option<String>,
}

/// One entry of a product's price history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    pub amount: Decimal,
    pub currency: String,
    pub store: String,
    pub date_recorded: DateTime<Utc>,
}

/// A canonical product from the local catalog with its price summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalProduct {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub nutrition_grade: Option<String>,
    pub average_price: Option<Decimal>,
    pub best_price: Option<BestPrice>,
    /// Newest first, at most 10 entries.
    pub prices: Vec<PricePoint>,
}

/// A product record from the external product database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProduct {
    pub barcode: String,
    /// May be empty; the aggregator discards unnamed hits.
    pub name: String,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub nutrition_grade: Option<String>,
    pub categories: Vec<String>,
}

impl From<OffProduct> for ExternalProduct {
    fn from(p: OffProduct) -> Self {
        Self {
            barcode: p.barcode,
            name: p.name,
            brand: p.brand,
            image_url: p.image_url,
            nutrition_grade: p.nutrition_grade,
            categories: p.categories,
        }
    }
}

/// Name search over the canonical product catalog.
#[async_trait]
pub trait LocalCandidateSource: Send + Sync {
    /// Products whose name contains `query`, at most `limit` of them.
    async fn search_by_name(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocalProduct>, SourceError>;
}

/// Barcode lookup and text search over an external product database.
#[async_trait]
pub trait ExternalCandidateSource: Send + Sync {
    /// `Ok(None)` when the database does not know the barcode.
    async fn lookup_barcode(&self, barcode: &str) -> Result<Option<ExternalProduct>, SourceError>;

    async fn search_text(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ExternalProduct>, SourceError>;
}

#[async_trait]
impl ExternalCandidateSource for OpenFoodClient {
    async fn lookup_barcode(&self, barcode: &str) -> Result<Option<ExternalProduct>, SourceError> {
        Ok(self.get_product(barcode).await?.map(ExternalProduct::from))
    }

    async fn search_text(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ExternalProduct>, SourceError> {
        let products = self.search(query, limit).await?;
        Ok(products.into_iter().map(ExternalProduct::from).collect())
    }
}
