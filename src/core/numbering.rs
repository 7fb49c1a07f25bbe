use async_trait::async_trait;
use tracing::warn;

use super::error::StoreError;

/// Counter scope for invoice numbers in the backing store.
pub const INVOICE_COUNTER_SCOPE: &str = "invoices";

// A lost swap means another caller minted a number in between, so the
// retry count bounds how many concurrent minters one call can lose to.
const MAX_CAS_ATTEMPTS: usize = 32;

/// Format a sequential invoice number: `INV-{year}-{sequence:06}`.
pub fn format_invoice_number(year: i32, sequence: u64) -> String {
    format!("INV-{year}-{sequence:06}")
}

/// Timestamp-derived fallback number used when the counter store is
/// unavailable: `INV-{year}-{last 8 digits of epoch millis}`. Not
/// sequential, but unique with overwhelming probability.
pub fn fallback_invoice_number(year: i32, epoch_millis: i64) -> String {
    let tail = epoch_millis.unsigned_abs() % 100_000_000;
    format!("INV-{year}-{tail:08}")
}

/// Persistent counter with an atomic compare-and-swap primitive.
///
/// `compare_and_swap` must atomically replace the counter value with
/// `next` only if it still equals `current`, returning whether the swap
/// took effect. A missing counter reads as 0.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn load(&self, scope: &str) -> Result<u64, StoreError>;

    async fn compare_and_swap(
        &self,
        scope: &str,
        current: u64,
        next: u64,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
impl<T: CounterStore + ?Sized> CounterStore for std::sync::Arc<T> {
    async fn load(&self, scope: &str) -> Result<u64, StoreError> {
        (**self).load(scope).await
    }

    async fn compare_and_swap(
        &self,
        scope: &str,
        current: u64,
        next: u64,
    ) -> Result<bool, StoreError> {
        (**self).compare_and_swap(scope, current, next).await
    }
}

/// Invoice number sequencer backed by a [`CounterStore`].
///
/// Runs a bounded CAS loop so concurrent callers can never mint the same
/// number; a lost race retries against the fresh counter value.
#[derive(Debug)]
pub struct InvoiceSequencer<C> {
    store: C,
}

impl<C: CounterStore> InvoiceSequencer<C> {
    pub fn new(store: C) -> Self {
        Self { store }
    }

    /// Mint the next invoice number for the given year.
    ///
    /// # Errors
    ///
    /// Propagates store failures; returns [`StoreError::Contention`] if
    /// the CAS loop exhausts its attempts. Callers that must not fail
    /// fall back to [`fallback_invoice_number`].
    pub async fn next_number(&self, year: i32) -> Result<String, StoreError> {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let current = self.store.load(INVOICE_COUNTER_SCOPE).await?;
            let next = current + 1;
            if self
                .store
                .compare_and_swap(INVOICE_COUNTER_SCOPE, current, next)
                .await?
            {
                return Ok(format_invoice_number(year, next));
            }
            warn!(attempt, current, "invoice counter CAS lost, retrying");
        }
        Err(StoreError::Contention(MAX_CAS_ATTEMPTS))
    }
}
