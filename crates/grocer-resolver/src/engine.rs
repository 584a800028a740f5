//! The conversion orchestrator: suggests canonical products for free-text
//! shopping items and binds an item to the product the caller picks.
//!
//! Every entry point loads the item and its list and checks edit rights
//! before touching storage, so a refused request never writes.

use std::time::Duration;

use grocer_core::{parse_item, AppConfig, ItemState, Principal, ShoppingItem};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::candidates::{
    Candidate, CandidateAggregator, ExternalEnrichment, DEFAULT_SOURCE_TIMEOUT, MAX_CANDIDATES,
};
use crate::confidence::{overall_confidence, quick_add_option, QuickAddOption};
use crate::error::{ConversionError, StoreError};
use crate::sources::{ExternalCandidateSource, LocalCandidateSource};
use crate::store::{ItemStore, NewProduct, PermissionChecker};

/// Shortest accepted name for a custom product.
const MIN_CUSTOM_NAME_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    pub candidate_limit: usize,
    pub source_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            candidate_limit: MAX_CANDIDATES,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }
}

impl ResolverSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            candidate_limit: config.resolver_candidate_limit,
            source_timeout: Duration::from_millis(config.resolver_source_timeout_ms),
        }
    }
}

/// Ranked suggestions for one item. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSuggestion {
    pub item_id: Uuid,
    pub item_name: String,
    pub confidence: u8,
    pub suggested_candidates: Vec<Candidate>,
    pub external_enrichment: Option<ExternalEnrichment>,
    pub quick_add: Option<QuickAddOption>,
}

/// The caller's pick for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConversionChoice {
    /// Bind to a product already in the catalog.
    UseExisting { product_id: Uuid },
    /// Import the external record with this barcode, then bind to it.
    CreateFromExternal { barcode: String },
    /// Create a product from caller-supplied fields, then bind to it.
    CreateCustom {
        name: String,
        #[serde(default)]
        brand: Option<String>,
        #[serde(default)]
        barcode: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub success: bool,
    pub item_id: Uuid,
    pub product_id: Option<String>,
    pub error: Option<String>,
}

impl ConversionResult {
    fn succeeded(item_id: Uuid, product_id: Uuid) -> Self {
        Self {
            success: true,
            item_id,
            product_id: Some(product_id.to_string()),
            error: None,
        }
    }

    fn failed(item_id: Uuid, error: &ConversionError) -> Self {
        Self {
            success: false,
            item_id,
            product_id: None,
            error: Some(error.to_string()),
        }
    }
}

pub struct ConversionEngine<L, E, S, P> {
    aggregator: CandidateAggregator<L, E>,
    store: S,
    permissions: P,
}

impl<L, E, S, P> ConversionEngine<L, E, S, P>
where
    L: LocalCandidateSource,
    E: ExternalCandidateSource,
    S: ItemStore,
    P: PermissionChecker,
{
    pub fn new(local: L, external: E, store: S, permissions: P, settings: ResolverSettings) -> Self {
        let aggregator = CandidateAggregator::new(local, external)
            .with_limit(settings.candidate_limit)
            .with_source_timeout(settings.source_timeout);
        Self {
            aggregator,
            store,
            permissions,
        }
    }

    /// Computes ranked suggestions for an unresolved item.
    ///
    /// # Errors
    ///
    /// [`ConversionError::ItemNotFound`] / [`ConversionError::ListNotFound`]
    /// for missing records, [`ConversionError::Unauthorized`] without edit
    /// rights, [`ConversionError::AlreadyResolved`] for bound items,
    /// [`ConversionError::Validation`] for a blank name, and
    /// [`ConversionError::Storage`] on backend failure. Candidate source
    /// failures are not errors.
    pub async fn suggest(
        &self,
        principal: &Principal,
        item_id: Uuid,
    ) -> Result<ConversionSuggestion, ConversionError> {
        let item = self.load_editable(principal, item_id).await?;
        if item.product_id.is_some() {
            return Err(ConversionError::AlreadyResolved(item.id));
        }
        if item.name.trim().is_empty() {
            return Err(ConversionError::Validation(
                "item name must not be empty".to_owned(),
            ));
        }

        let parsed = parse_item(&item.name);
        let set = self
            .aggregator
            .find_candidates(&parsed, item.barcode.as_deref())
            .await;
        let confidence = overall_confidence(&set.candidates);
        let quick_add = quick_add_option(&parsed, &set.candidates);

        tracing::info!(
            item_id = %item.id,
            candidates = set.candidates.len(),
            confidence,
            "computed conversion suggestions"
        );

        Ok(ConversionSuggestion {
            item_id: item.id,
            item_name: item.name,
            confidence,
            suggested_candidates: set.candidates,
            external_enrichment: set.external_enrichment,
            quick_add,
        })
    }

    /// Applies `choice` and reports the outcome as data. Never fails; see
    /// [`Self::try_convert`] for typed errors.
    pub async fn convert(
        &self,
        principal: &Principal,
        item_id: Uuid,
        choice: ConversionChoice,
    ) -> ConversionResult {
        match self.try_convert(principal, item_id, choice).await {
            Ok(product_id) => ConversionResult::succeeded(item_id, product_id),
            Err(e) => {
                tracing::warn!(item_id = %item_id, error = %e, "conversion failed");
                ConversionResult::failed(item_id, &e)
            }
        }
    }

    /// Binds the item to the product selected by `choice` and returns the
    /// product id.
    ///
    /// Choosing the product an item is already bound to succeeds without a
    /// write. Any other choice on a bound item is refused.
    ///
    /// # Errors
    ///
    /// As [`Self::suggest`], plus [`ConversionError::ProductNotFound`] for an
    /// unknown `UseExisting` product and [`ConversionError::Validation`] for
    /// a bad custom name or blank barcode. If another writer binds the item
    /// first, the result is [`ConversionError::AlreadyResolved`] (or success
    /// when it chose the same product); any other concurrent edit gives
    /// [`StoreError::Stale`] and nothing is written.
    pub async fn try_convert(
        &self,
        principal: &Principal,
        item_id: Uuid,
        choice: ConversionChoice,
    ) -> Result<Uuid, ConversionError> {
        let item = self.load_editable(principal, item_id).await?;

        if let Some(bound) = item.product_id {
            return match choice {
                ConversionChoice::UseExisting { product_id } if product_id == bound => Ok(bound),
                _ => Err(ConversionError::AlreadyResolved(item.id)),
            };
        }

        let product_id = match choice {
            ConversionChoice::UseExisting { product_id } => {
                self.store
                    .get_product(product_id)
                    .await?
                    .ok_or(ConversionError::ProductNotFound(product_id))?
                    .id
            }
            ConversionChoice::CreateFromExternal { barcode } => {
                self.create_from_external(&item, &barcode).await?
            }
            ConversionChoice::CreateCustom {
                name,
                brand,
                barcode,
            } => self.create_custom(&name, brand, barcode).await?,
        };

        match self
            .store
            .replace_item(item.with_product(product_id), item.updated_at)
            .await
        {
            Ok(_) => {}
            Err(StoreError::Stale(_)) => return self.settle_lost_write(item.id, product_id).await,
            Err(e) => return Err(e.into()),
        }
        tracing::info!(item_id = %item.id, product_id = %product_id, "item converted");
        Ok(product_id)
    }

    /// Decides the outcome after the item changed between read and write.
    /// An item now bound to `product_id` counts as converted; one bound to
    /// anything else is already resolved.
    async fn settle_lost_write(
        &self,
        item_id: Uuid,
        product_id: Uuid,
    ) -> Result<Uuid, ConversionError> {
        let current = self
            .store
            .get_item(item_id)
            .await?
            .ok_or(ConversionError::ItemNotFound(item_id))?;
        tracing::warn!(
            item_id = %item_id,
            bound = ?current.product_id,
            "item changed during conversion"
        );
        match current.product_id {
            Some(bound) if bound == product_id => Ok(bound),
            Some(_) => Err(ConversionError::AlreadyResolved(item_id)),
            None => Err(StoreError::Stale(item_id).into()),
        }
    }

    /// Ids of completed, unbound items in `list_id` whose names are worth
    /// resolving. Read-only.
    ///
    /// # Errors
    ///
    /// [`ConversionError::ListNotFound`] for an unknown list,
    /// [`ConversionError::Storage`] on backend failure.
    pub async fn identify_conversion_opportunities(
        &self,
        list_id: Uuid,
    ) -> Result<Vec<Uuid>, ConversionError> {
        if self.store.get_list(list_id).await?.is_none() {
            return Err(ConversionError::ListNotFound(list_id));
        }
        let items = self.store.list_items(list_id).await?;
        Ok(items
            .iter()
            .filter(|item| item.is_conversion_opportunity())
            .map(|item| item.id)
            .collect())
    }

    /// Closes the workflow for an item the caller chose not to convert.
    /// Nothing is stored.
    ///
    /// # Errors
    ///
    /// The existence, permission, and already-resolved checks of
    /// [`Self::suggest`].
    pub async fn dismiss(
        &self,
        principal: &Principal,
        item_id: Uuid,
    ) -> Result<ItemState, ConversionError> {
        let item = self.load_editable(principal, item_id).await?;
        if item.product_id.is_some() {
            return Err(ConversionError::AlreadyResolved(item.id));
        }
        tracing::debug!(item_id = %item.id, "conversion dismissed");
        Ok(ItemState::Unconverted)
    }

    async fn load_editable(
        &self,
        principal: &Principal,
        item_id: Uuid,
    ) -> Result<ShoppingItem, ConversionError> {
        let item = self
            .store
            .get_item(item_id)
            .await?
            .ok_or(ConversionError::ItemNotFound(item_id))?;
        let list = self
            .store
            .get_list(item.list_id)
            .await?
            .ok_or(ConversionError::ListNotFound(item.list_id))?;
        if !self.permissions.can_user_modify(list.id, principal.id).await? {
            return Err(ConversionError::Unauthorized {
                user_id: principal.id,
                list_id: list.id,
            });
        }
        Ok(item)
    }

    async fn create_from_external(
        &self,
        item: &ShoppingItem,
        barcode: &str,
    ) -> Result<Uuid, ConversionError> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(ConversionError::Validation(
                "barcode must not be empty".to_owned(),
            ));
        }
        if let Some(existing) = self.store.find_product_by_barcode(barcode).await? {
            return Ok(existing.id);
        }

        let new_product = match self.aggregator.lookup_external_barcode(barcode).await {
            Some(external) if !external.name.trim().is_empty() => {
                NewProduct::from_external(&external)
            }
            _ => {
                let parsed = parse_item(&item.name);
                let name = if parsed.name.is_empty() {
                    item.name.trim()
                } else {
                    parsed.name.as_str()
                };
                tracing::warn!(
                    event = "ExternalCreateFallback",
                    item_id = %item.id,
                    barcode,
                    "external product unavailable; creating placeholder"
                );
                // Synthesized barcode: the real one stays free for a later lookup.
                NewProduct::placeholder(name, None, None)
            }
        };

        Ok(self.store.create_product(new_product).await?.id)
    }

    async fn create_custom(
        &self,
        name: &str,
        brand: Option<String>,
        barcode: Option<String>,
    ) -> Result<Uuid, ConversionError> {
        let name = name.trim();
        if name.chars().count() < MIN_CUSTOM_NAME_CHARS {
            return Err(ConversionError::Validation(format!(
                "product name must have at least {MIN_CUSTOM_NAME_CHARS} characters"
            )));
        }
        let brand = brand
            .map(|b| b.trim().to_owned())
            .filter(|b| !b.is_empty());
        let barcode = barcode
            .map(|b| b.trim().to_owned())
            .filter(|b| !b.is_empty());

        if let Some(code) = barcode.as_deref() {
            if let Some(existing) = self.store.find_product_by_barcode(code).await? {
                return Ok(existing.id);
            }
        }

        let product = NewProduct::placeholder(name, brand, barcode);
        Ok(self.store.create_product(product).await?.id)
    }
}
