use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::core::{CounterStore, Invoice, InvoiceStatus, ServiceType, StoreError};
use crate::pricing::{PricingRule, RuleStore};

use super::InvoiceStore;

/// In-memory invoice store.
///
/// Primary store for single-process deployments and tests, and the
/// local fallback target of [`super::FallbackInvoiceStore`]. Documents
/// are kept in insertion order; ids are assigned sequentially.
#[derive(Debug, Default)]
pub struct MemoryInvoiceStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    documents: HashMap<String, Invoice>,
    insertion: Vec<String>,
    next_id: u64,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored invoices.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn create(&self, invoice: &Invoice) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.next_id += 1;
        let id = format!("inv_{:06}", inner.next_id);
        let mut stored = invoice.clone();
        stored.id = Some(id.clone());
        inner.documents.insert(id.clone(), stored);
        inner.insertion.push(id.clone());
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<Invoice>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.documents.get(id).cloned())
    }

    async fn get_by_order(&self, order_id: &str) -> Result<Vec<Invoice>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .insertion
            .iter()
            .filter_map(|id| inner.documents.get(id))
            .filter(|inv| inv.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Invoice>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut all: Vec<Invoice> = inner
            .insertion
            .iter()
            .rev()
            .filter_map(|id| inner.documents.get(id))
            .cloned()
            .collect();
        // Stable sort keeps reverse insertion order within equal stamps.
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_status(&self, id: &str, status: InvoiceStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let invoice = inner
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        invoice.status = status;
        invoice.updated_at = Utc::now();
        Ok(())
    }
}

/// In-memory counter with an atomic compare-and-swap, for the invoice
/// number sequencer.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<String, u64>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a counter value, e.g. when migrating an existing sequence.
    pub fn seed(&self, scope: &str, value: u64) {
        self.counters
            .lock()
            .expect("counter mutex poisoned")
            .insert(scope.to_string(), value);
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn load(&self, scope: &str) -> Result<u64, StoreError> {
        let counters = self.counters.lock().expect("counter mutex poisoned");
        Ok(counters.get(scope).copied().unwrap_or(0))
    }

    async fn compare_and_swap(
        &self,
        scope: &str,
        current: u64,
        next: u64,
    ) -> Result<bool, StoreError> {
        let mut counters = self.counters.lock().expect("counter mutex poisoned");
        let entry = counters.entry(scope.to_string()).or_insert(0);
        if *entry == current {
            *entry = next;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// In-memory pricing rule table keyed like the document store
/// ("SE_apostille").
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: Mutex<HashMap<String, PricingRule>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a rule under its country + service key.
    pub fn upsert(&self, rule: PricingRule) {
        self.rules
            .lock()
            .expect("rule mutex poisoned")
            .insert(rule.key(), rule);
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn rule(
        &self,
        country_code: &str,
        service_type: ServiceType,
    ) -> Result<Option<PricingRule>, StoreError> {
        let rules = self.rules.lock().expect("rule mutex poisoned");
        let key = format!("{}_{}", country_code.to_uppercase(), service_type.code());
        Ok(rules.get(&key).cloned())
    }
}
