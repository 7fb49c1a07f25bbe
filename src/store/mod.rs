//! Invoice persistence: the store trait, an in-memory document store,
//! and a degrade-to-local fallback wrapper.

mod fallback;
mod memory;

pub use fallback::*;
pub use memory::*;

use async_trait::async_trait;

use crate::core::{Invoice, InvoiceStatus, StoreError};

/// Persistence operations for invoices.
///
/// Backed by a document store with read-after-write consistency on
/// single-document operations. Implementations assign document ids on
/// `create`.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Persist a new invoice, returning its assigned id.
    async fn create(&self, invoice: &Invoice) -> Result<String, StoreError>;

    /// Read an invoice by id. `Ok(None)` when absent.
    async fn get(&self, id: &str) -> Result<Option<Invoice>, StoreError>;

    /// All invoices created for an order, in creation order.
    async fn get_by_order(&self, order_id: &str) -> Result<Vec<Invoice>, StoreError>;

    /// All invoices, newest first.
    async fn list_all(&self) -> Result<Vec<Invoice>, StoreError>;

    /// Update the status of an existing invoice.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no invoice has the id.
    async fn update_status(&self, id: &str, status: InvoiceStatus) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: InvoiceStore + ?Sized> InvoiceStore for std::sync::Arc<T> {
    async fn create(&self, invoice: &Invoice) -> Result<String, StoreError> {
        (**self).create(invoice).await
    }

    async fn get(&self, id: &str) -> Result<Option<Invoice>, StoreError> {
        (**self).get(id).await
    }

    async fn get_by_order(&self, order_id: &str) -> Result<Vec<Invoice>, StoreError> {
        (**self).get_by_order(order_id).await
    }

    async fn list_all(&self) -> Result<Vec<Invoice>, StoreError> {
        (**self).list_all().await
    }

    async fn update_status(&self, id: &str, status: InvoiceStatus) -> Result<(), StoreError> {
        (**self).update_status(id, status).await
    }
}
