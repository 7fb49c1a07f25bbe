use async_trait::async_trait;
use tracing::warn;

use crate::core::{Invoice, InvoiceStatus, StoreError};

use super::memory::MemoryInvoiceStore;
use super::InvoiceStore;

/// Store adapter that degrades to a local in-memory store when the
/// primary fails.
///
/// The degradation is per-operation: a read against the fallback only
/// sees fallback-written data, no cross-store synchronization is
/// attempted. This mirrors the order subsystem's resilience policy of
/// preferring a degraded write over a lost one.
pub struct FallbackInvoiceStore<P> {
    primary: P,
    fallback: MemoryInvoiceStore,
}

impl<P: InvoiceStore> FallbackInvoiceStore<P> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: MemoryInvoiceStore::new(),
        }
    }

    /// The local fallback store, e.g. for reconciliation after an
    /// outage.
    pub fn fallback(&self) -> &MemoryInvoiceStore {
        &self.fallback
    }
}

#[async_trait]
impl<P: InvoiceStore> InvoiceStore for FallbackInvoiceStore<P> {
    async fn create(&self, invoice: &Invoice) -> Result<String, StoreError> {
        match self.primary.create(invoice).await {
            Ok(id) => Ok(id),
            Err(err) => {
                warn!(error = %err, "primary invoice store failed on create, using local fallback");
                self.fallback.create(invoice).await
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Invoice>, StoreError> {
        match self.primary.get(id).await {
            Ok(found) => Ok(found),
            Err(err) => {
                warn!(error = %err, "primary invoice store failed on get, using local fallback");
                self.fallback.get(id).await
            }
        }
    }

    async fn get_by_order(&self, order_id: &str) -> Result<Vec<Invoice>, StoreError> {
        match self.primary.get_by_order(order_id).await {
            Ok(found) => Ok(found),
            Err(err) => {
                warn!(error = %err, "primary invoice store failed on order query, using local fallback");
                self.fallback.get_by_order(order_id).await
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<Invoice>, StoreError> {
        match self.primary.list_all().await {
            Ok(found) => Ok(found),
            Err(err) => {
                warn!(error = %err, "primary invoice store failed on list, using local fallback");
                self.fallback.list_all().await
            }
        }
    }

    async fn update_status(&self, id: &str, status: InvoiceStatus) -> Result<(), StoreError> {
        match self.primary.update_status(id, status).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound(id)) => Err(StoreError::NotFound(id)),
            Err(err) => {
                warn!(error = %err, "primary invoice store failed on status update, using local fallback");
                self.fallback.update_status(id, status).await
            }
        }
    }
}
