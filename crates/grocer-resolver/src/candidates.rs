//! Candidate aggregation across the local catalog and the external product
//! database.
//!
//! A barcode, when present, is tried first as an exact external lookup. On a
//! miss the parsed name is searched in both sources concurrently, each
//! bounded by a timeout. A failing source contributes nothing; aggregation
//! itself never fails.

use std::future::Future;
use std::time::Duration;

use grocer_core::{similarity_score, ParsedItem};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::SourceError;
use crate::sources::{
    BestPrice, ExternalCandidateSource, ExternalProduct, LocalCandidateSource, LocalProduct,
};

/// Most candidates returned per request, and the ceiling on per-source limits.
pub const MAX_CANDIDATES: usize = 5;

/// Fixed score of an exact barcode hit.
pub const BARCODE_MATCH_SCORE: u8 = 95;

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_millis(4000);

const LOCAL_SOURCE: &str = "local";
const EXTERNAL_SOURCE: &str = "external";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    Local,
    External,
}

/// A possible canonical product for a shopping item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// `local:<uuid>` or `off:<barcode>`.
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub nutrition_grade: Option<String>,
    pub average_price: Option<Decimal>,
    pub best_price: Option<BestPrice>,
    /// 0..=100.
    pub match_score: u8,
    pub source: CandidateSource,
}

impl Candidate {
    fn from_local(product: LocalProduct, match_score: u8) -> Self {
        Self {
            id: format!("local:{}", product.id),
            name: product.name,
            brand: product.brand,
            barcode: product.barcode,
            image_url: product.image_url,
            nutrition_grade: product.nutrition_grade,
            average_price: product.average_price,
            best_price: product.best_price,
            match_score: match_score.min(100),
            source: CandidateSource::Local,
        }
    }

    fn from_external(product: &ExternalProduct, match_score: u8) -> Self {
        Self {
            id: format!("off:{}", product.barcode),
            name: product.name.trim().to_owned(),
            brand: product.brand.clone(),
            barcode: Some(product.barcode.clone()),
            image_url: product.image_url.clone(),
            nutrition_grade: product.nutrition_grade.clone(),
            average_price: None,
            best_price: None,
            match_score: match_score.min(100),
            source: CandidateSource::External,
        }
    }
}

/// External metadata shown next to a suggestion and reused on product
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalEnrichment {
    pub barcode: String,
    pub brand: Option<String>,
    pub nutrition_grade: Option<String>,
    pub image_url: Option<String>,
    pub categories: Vec<String>,
}

impl From<&ExternalProduct> for ExternalEnrichment {
    fn from(p: &ExternalProduct) -> Self {
        Self {
            barcode: p.barcode.clone(),
            brand: p.brand.clone(),
            nutrition_grade: p.nutrition_grade.clone(),
            image_url: p.image_url.clone(),
            categories: p.categories.clone(),
        }
    }
}

/// Ranked candidates (best first, at most [`MAX_CANDIDATES`]) and the
/// enrichment of the best external hit, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    pub candidates: Vec<Candidate>,
    pub external_enrichment: Option<ExternalEnrichment>,
}

pub struct CandidateAggregator<L, E> {
    local: L,
    external: E,
    limit: usize,
    source_timeout: Duration,
}

impl<L, E> CandidateAggregator<L, E>
where
    L: LocalCandidateSource,
    E: ExternalCandidateSource,
{
    pub fn new(local: L, external: E) -> Self {
        Self {
            local,
            external,
            limit: MAX_CANDIDATES,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    /// Per-source result limit, clamped to `1..=MAX_CANDIDATES`.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_CANDIDATES);
        self
    }

    #[must_use]
    pub fn with_source_timeout(mut self, source_timeout: Duration) -> Self {
        self.source_timeout = source_timeout;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn external(&self) -> &E {
        &self.external
    }

    /// Exact external lookup bounded by the source timeout. Failures are
    /// logged and reported as a miss.
    pub async fn lookup_external_barcode(&self, barcode: &str) -> Option<ExternalProduct> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return None;
        }
        bounded(
            EXTERNAL_SOURCE,
            self.source_timeout,
            self.external.lookup_barcode(barcode),
        )
        .await
        .flatten()
    }

    /// Finds ranked candidates for `parsed`, trying `barcode` first.
    pub async fn find_candidates(&self, parsed: &ParsedItem, barcode: Option<&str>) -> CandidateSet {
        if let Some(barcode) = barcode {
            match self.lookup_external_barcode(barcode).await {
                Some(hit) if !hit.name.trim().is_empty() => {
                    tracing::debug!(barcode = %hit.barcode, "barcode matched external product");
                    return CandidateSet {
                        candidates: vec![Candidate::from_external(&hit, BARCODE_MATCH_SCORE)],
                        external_enrichment: Some(ExternalEnrichment::from(&hit)),
                    };
                }
                _ => {
                    tracing::debug!(barcode, "barcode lookup missed; falling back to text search");
                }
            }
        }

        let query = parsed.name.trim();
        if query.is_empty() {
            return CandidateSet::default();
        }

        let (local, external) = tokio::join!(
            bounded(
                LOCAL_SOURCE,
                self.source_timeout,
                self.local.search_by_name(query, self.limit),
            ),
            bounded(
                EXTERNAL_SOURCE,
                self.source_timeout,
                self.external.search_text(query, self.limit),
            ),
        );

        let mut ranked: Vec<(Candidate, Option<ExternalEnrichment>)> = local
            .unwrap_or_default()
            .into_iter()
            .take(self.limit)
            .map(|p| {
                let score = similarity_score(query, &p.name);
                (Candidate::from_local(p, score), None)
            })
            .collect();

        ranked.extend(
            external
                .unwrap_or_default()
                .iter()
                .filter(|p| !p.name.trim().is_empty())
                .take(self.limit)
                .map(|p| {
                    let score = similarity_score(query, &p.name);
                    (Candidate::from_external(p, score), Some(ExternalEnrichment::from(p)))
                }),
        );

        // Stable: local entries were pushed first and keep precedence on ties.
        ranked.sort_by(|a, b| b.0.match_score.cmp(&a.0.match_score));

        let external_enrichment = ranked.iter().find_map(|(_, e)| e.clone());
        let candidates = ranked
            .into_iter()
            .take(MAX_CANDIDATES)
            .map(|(c, _)| c)
            .collect();

        CandidateSet {
            candidates,
            external_enrichment,
        }
    }
}

/// Runs one source call under `limit`, turning failures into `None` with a
/// `warn` log naming the source.
async fn bounded<T, F>(source: &'static str, limit: Duration, call: F) -> Option<T>
where
    F: Future<Output = Result<T, SourceError>>,
{
    let error = match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => return Some(value),
        Ok(Err(e)) => e,
        Err(_) => SourceError::Timeout {
            source_name: source,
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        },
    };
    tracing::warn!(source, error = %error, "candidate source failed; continuing without it");
    None
}
