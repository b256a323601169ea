//! Scripted in-process catalog shared by the integration tests.

#![allow(dead_code)]

use shopfront::api::ProductsApi;
use shopfront::storage::{shared, MemoryStore, SharedStore};
use shopfront::worker::InlineWorker;
use shopfront::{initialize_inline, CatalogError, CatalogStore, Category, Product, ProductPage, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How long a test waits for the inline worker; responses are already queued.
pub const WAIT: Duration = Duration::from_millis(100);

pub const CATEGORIES: [&str; 3] = ["smartphones", "laptops", "groceries"];

/// A catalog of `total` products, cycling through [`CATEGORIES`], that can be
/// switched offline. Clones share state.
#[derive(Clone)]
pub struct FakeCatalog {
    products: Arc<Vec<Product>>,
    offline: Arc<AtomicBool>,
    fail_after: Arc<Mutex<Option<usize>>>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeCatalog {
    pub fn new(total: u64) -> Self {
        let products = (1..=total)
            .map(|id| {
                let category = CATEGORIES[usize::try_from(id).unwrap() % CATEGORIES.len()];
                let mut product =
                    Product::new(id, format!("Item {id}"), category, f64::from(u32::try_from(id % 7).unwrap()) + 1.0);
                if id % 5 == 0 {
                    product.title = format!("Phone {id}");
                }
                product.rating = f64::from(u32::try_from(id % 5).unwrap());
                product
            })
            .collect();
        Self {
            products: Arc::new(products),
            offline: Arc::new(AtomicBool::new(false)),
            fail_after: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Lets `n` more calls succeed, then fails every call after them.
    pub fn fail_after(&self, n: usize) {
        *self.fail_after.lock().unwrap() = Some(self.calls() + n);
    }

    /// Stops failing calls.
    pub fn recover(&self) {
        self.set_offline(false);
        *self.fail_after.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests seen so far, as `"<scope> skip=<n>"`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn begin(&self, label: String) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(label);
        if self.offline.load(Ordering::SeqCst) {
            return Err(CatalogError::Network(
                "Network error. Please check your connection.".to_string(),
            ));
        }
        if matches!(*self.fail_after.lock().unwrap(), Some(limit) if call >= limit) {
            return Err(CatalogError::from_status(500, None));
        }
        Ok(())
    }

    fn page(matching: Vec<Product>, limit: u32, skip: u32) -> ProductPage {
        let total = u32::try_from(matching.len()).unwrap();
        let products = matching
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect();
        ProductPage { products, total, skip, limit }
    }
}

impl ProductsApi for FakeCatalog {
    fn list(&self, limit: u32, skip: u32) -> Result<ProductPage> {
        self.begin(format!("all skip={skip}"))?;
        Ok(Self::page(self.products.to_vec(), limit, skip))
    }

    fn by_category(&self, slug: &str, limit: u32, skip: u32) -> Result<ProductPage> {
        self.begin(format!("category:{slug} skip={skip}"))?;
        let matching = self.products.iter().filter(|p| p.category == slug).cloned().collect();
        Ok(Self::page(matching, limit, skip))
    }

    fn search(&self, query: &str, limit: u32, skip: u32) -> Result<ProductPage> {
        self.begin(format!("search:{query} skip={skip}"))?;
        let needle = query.to_lowercase();
        let matching = self
            .products
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        // Search reports the full result size even though it is only paged once.
        Ok(Self::page(matching, limit, skip))
    }

    fn categories(&self) -> Result<Vec<Category>> {
        self.begin("categories".to_string())?;
        Ok(CATEGORIES.iter().map(|slug| Category::from_slug(*slug)).collect())
    }

    fn product(&self, id: u64) -> Result<Product> {
        self.begin(format!("product:{id}"))?;
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::from_status(404, None))
    }
}

/// Store over `api` and a fresh in-memory key-value store.
pub fn inline_store(api: &FakeCatalog) -> (CatalogStore<InlineWorker>, SharedStore) {
    let kv = shared(MemoryStore::new());
    let store = store_with(api, kv.clone());
    (store, kv)
}

pub fn store_with(api: &FakeCatalog, kv: SharedStore) -> CatalogStore<InlineWorker> {
    let mut store = initialize_inline(Box::new(api.clone()), kv, 10).unwrap();
    store.wait_idle(WAIT).unwrap();
    store
}
