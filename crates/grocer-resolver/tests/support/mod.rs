//! In-memory collaborators shared by the resolver integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grocer_core::{Principal, ShoppingItem, ShoppingList, Unit};
use grocer_resolver::{
    CatalogProduct, ExternalCandidateSource, ExternalProduct, ItemStore, LocalCandidateSource,
    LocalProduct, NewProduct, PermissionChecker, SourceError, StoreError,
};
use rust_decimal::Decimal;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Candidate sources
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
pub struct FakeLocal {
    pub products: Vec<LocalProduct>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

#[async_trait]
impl LocalCandidateSource for FakeLocal {
    async fn search_by_name(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocalProduct>, SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(SourceError::Unavailable("local catalog offline".to_string()));
        }
        let query = query.to_lowercase();
        Ok(self
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct FakeExternal {
    pub by_barcode: HashMap<String, ExternalProduct>,
    pub search_results: Vec<ExternalProduct>,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub barcode_lookups: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ExternalCandidateSource for FakeExternal {
    async fn lookup_barcode(&self, barcode: &str) -> Result<Option<ExternalProduct>, SourceError> {
        self.barcode_lookups
            .lock()
            .unwrap()
            .push(barcode.to_string());
        if self.fail {
            return Err(SourceError::Unavailable("external catalog offline".to_string()));
        }
        Ok(self.by_barcode.get(barcode).cloned())
    }

    async fn search_text(
        &self,
        _query: &str,
        limit: usize,
    ) -> Result<Vec<ExternalProduct>, SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(SourceError::Unavailable("external catalog offline".to_string()));
        }
        Ok(self.search_results.iter().take(limit).cloned().collect())
    }
}

pub fn local_product(name: &str) -> LocalProduct {
    LocalProduct {
        id: Uuid::new_v4(),
        name: name.to_string(),
        brand: None,
        barcode: None,
        image_url: None,
        nutrition_grade: None,
        average_price: None,
        best_price: None,
        prices: vec![],
    }
}

pub fn external_product(barcode: &str, name: &str) -> ExternalProduct {
    ExternalProduct {
        barcode: barcode.to_string(),
        name: name.to_string(),
        brand: Some("Acme".to_string()),
        image_url: None,
        nutrition_grade: Some("b".to_string()),
        categories: vec!["Groceries".to_string()],
    }
}

// ---------------------------------------------------------------------------
// Item store and permissions
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StoreState {
    pub items: HashMap<Uuid, ShoppingItem>,
    pub lists: HashMap<Uuid, ShoppingList>,
    pub products: HashMap<Uuid, CatalogProduct>,
    pub created: Vec<NewProduct>,
    pub replaced: Vec<ShoppingItem>,
}

/// Cloneable handle; clones share state so tests can inspect writes.
#[derive(Default, Clone)]
pub struct MemoryStore {
    pub state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn add_list(&self, owner_id: Uuid) -> Uuid {
        let list = ShoppingList {
            id: Uuid::new_v4(),
            owner_id,
            name: "Weekly shop".to_string(),
        };
        let id = list.id;
        self.state.lock().unwrap().lists.insert(id, list);
        id
    }

    pub fn add_item(&self, list_id: Uuid, name: &str, is_completed: bool) -> Uuid {
        let now = Utc::now();
        let item = ShoppingItem {
            id: Uuid::new_v4(),
            list_id,
            name: name.to_string(),
            quantity: Decimal::from(2),
            unit: Unit::Kg,
            price: Some(Decimal::new(299, 2)),
            notes: Some("the big bag".to_string()),
            barcode: None,
            product_id: None,
            is_completed,
            created_at: now,
            updated_at: now,
        };
        let id = item.id;
        self.state.lock().unwrap().items.insert(id, item);
        id
    }

    pub fn set_item_barcode(&self, item_id: Uuid, barcode: &str) {
        if let Some(item) = self.state.lock().unwrap().items.get_mut(&item_id) {
            item.barcode = Some(barcode.to_string());
        }
    }

    pub fn bind_item(&self, item_id: Uuid, product_id: Uuid) {
        if let Some(item) = self.state.lock().unwrap().items.get_mut(&item_id) {
            item.product_id = Some(product_id);
        }
    }

    pub fn add_product(&self, name: &str, barcode: &str) -> Uuid {
        let product = CatalogProduct {
            id: Uuid::new_v4(),
            name: name.to_string(),
            brand: None,
            barcode: barcode.to_string(),
        };
        let id = product.id;
        self.state.lock().unwrap().products.insert(id, product);
        id
    }

    pub fn item(&self, id: Uuid) -> ShoppingItem {
        self.state.lock().unwrap().items[&id].clone()
    }

    pub fn created(&self) -> Vec<NewProduct> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn write_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.created.len() + state.replaced.len()
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn get_item(&self, id: Uuid) -> Result<Option<ShoppingItem>, StoreError> {
        Ok(self.state.lock().unwrap().items.get(&id).cloned())
    }

    async fn get_list(&self, id: Uuid) -> Result<Option<ShoppingList>, StoreError> {
        Ok(self.state.lock().unwrap().lists.get(&id).cloned())
    }

    async fn list_items(&self, list_id: Uuid) -> Result<Vec<ShoppingItem>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<ShoppingItem> = state
            .items
            .values()
            .filter(|i| i.list_id == list_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.created_at);
        Ok(items)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<CatalogProduct>, StoreError> {
        Ok(self.state.lock().unwrap().products.get(&id).cloned())
    }

    async fn find_product_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<CatalogProduct>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .products
            .values()
            .find(|p| p.barcode == barcode)
            .cloned())
    }

    async fn create_product(&self, product: NewProduct) -> Result<CatalogProduct, StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.products.values().find(|p| p.barcode == product.barcode) {
            return Ok(existing.clone());
        }
        let created = CatalogProduct {
            id: Uuid::new_v4(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            barcode: product.barcode.clone(),
        };
        state.products.insert(created.id, created.clone());
        state.created.push(product);
        Ok(created)
    }

    async fn replace_item(
        &self,
        item: ShoppingItem,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<ShoppingItem, StoreError> {
        let mut state = self.state.lock().unwrap();
        let Some(stored) = state.items.get(&item.id) else {
            return Err(StoreError::Backend(format!("item {} vanished", item.id)));
        };
        if stored.updated_at != expected_updated_at {
            return Err(StoreError::Stale(item.id));
        }
        state.items.insert(item.id, item.clone());
        state.replaced.push(item.clone());
        Ok(item)
    }
}

/// Wraps a [`MemoryStore`] and holds the first `parties` calls to
/// `get_item` until all of them have read, so concurrent conversions all see
/// the same unbound item before any of them writes.
#[derive(Clone)]
pub struct GatedStore {
    pub inner: MemoryStore,
    parties: usize,
    reads: Arc<AtomicUsize>,
    gate: Arc<tokio::sync::Barrier>,
}

impl GatedStore {
    pub fn new(inner: MemoryStore, parties: usize) -> Self {
        Self {
            inner,
            parties,
            reads: Arc::new(AtomicUsize::new(0)),
            gate: Arc::new(tokio::sync::Barrier::new(parties)),
        }
    }
}

#[async_trait]
impl ItemStore for GatedStore {
    async fn get_item(&self, id: Uuid) -> Result<Option<ShoppingItem>, StoreError> {
        let item = self.inner.get_item(id).await?;
        if self.reads.fetch_add(1, Ordering::SeqCst) < self.parties {
            self.gate.wait().await;
        }
        Ok(item)
    }

    async fn get_list(&self, id: Uuid) -> Result<Option<ShoppingList>, StoreError> {
        self.inner.get_list(id).await
    }

    async fn list_items(&self, list_id: Uuid) -> Result<Vec<ShoppingItem>, StoreError> {
        self.inner.list_items(list_id).await
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<CatalogProduct>, StoreError> {
        self.inner.get_product(id).await
    }

    async fn find_product_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<CatalogProduct>, StoreError> {
        self.inner.find_product_by_barcode(barcode).await
    }

    async fn create_product(&self, product: NewProduct) -> Result<CatalogProduct, StoreError> {
        self.inner.create_product(product).await
    }

    async fn replace_item(
        &self,
        item: ShoppingItem,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<ShoppingItem, StoreError> {
        self.inner.replace_item(item, expected_updated_at).await
    }
}

/// Grants edit rights to list owners plus any explicitly added editors.
#[derive(Clone)]
pub struct OwnerOrEditor {
    pub store: MemoryStore,
    pub editors: HashSet<(Uuid, Uuid)>,
}

#[async_trait]
impl PermissionChecker for OwnerOrEditor {
    async fn can_user_modify(&self, list_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let is_owner = self
            .store
            .state
            .lock()
            .unwrap()
            .lists
            .get(&list_id)
            .is_some_and(|l| l.owner_id == user_id);
        Ok(is_owner || self.editors.contains(&(list_id, user_id)))
    }
}

pub fn principal() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        email: "shopper@example.com".to_string(),
    }
}
