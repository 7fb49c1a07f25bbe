use chrono::{DateTime, Datelike, Utc};
use tracing::warn;

use crate::store::InvoiceStore;

use super::error::InvoiceError;
use super::numbering::{CounterStore, InvoiceSequencer, fallback_invoice_number};
use super::types::{Invoice, InvoiceStatus, LineItem};

/// Payment terms carried by credit notes.
pub const CREDIT_NOTE_TERMS: &str = "No payment required";

/// Create and persist a credit note mirroring an existing invoice.
///
/// Every monetary field of every line and of the totals is negated; the
/// credit note gets its own number, is due immediately, and references
/// the original both structurally (`related_invoice_id`) and in its
/// notes. The original invoice is never mutated.
///
/// # Errors
///
/// [`InvoiceError::NotFound`] when the original does not exist,
/// [`InvoiceError::AlreadyCredited`] when a credit note for it already
/// exists, and store errors from the final persist.
pub async fn create_credit_note<S, C>(
    store: &S,
    sequencer: &InvoiceSequencer<C>,
    original_id: &str,
    issued_at: DateTime<Utc>,
) -> Result<Invoice, InvoiceError>
where
    S: InvoiceStore,
    C: CounterStore,
{
    let original = store
        .get(original_id)
        .await?
        .ok_or_else(|| InvoiceError::NotFound(original_id.to_string()))?;

    let siblings = store.get_by_order(&original.order_id).await?;
    if let Some(existing) = siblings.iter().find(|inv| {
        inv.status == InvoiceStatus::CreditNote
            && inv.related_invoice_id.as_deref() == Some(original_id)
    }) {
        return Err(InvoiceError::AlreadyCredited {
            original: original.invoice_number.clone(),
            credit_note: existing.invoice_number.clone(),
        });
    }

    let year = issued_at.year();
    let invoice_number = match sequencer.next_number(year).await {
        Ok(number) => number,
        Err(err) => {
            warn!(error = %err, "sequencer unavailable, using timestamp credit note number");
            fallback_invoice_number(year, issued_at.timestamp_millis())
        }
    };

    let mut credit = Invoice {
        id: None,
        invoice_number: invoice_number.clone(),
        order_id: original.order_id.clone(),
        order_number: original.order_number.clone(),
        customer: original.customer.clone(),
        line_items: original.line_items.iter().map(negate_line).collect(),
        subtotal: -original.subtotal,
        vat_total: -original.vat_total,
        total_amount: -original.total_amount,
        currency: original.currency.clone(),
        issue_date: issued_at,
        // Immediately due: nothing is outstanding on a credit note.
        due_date: issued_at,
        status: InvoiceStatus::CreditNote,
        payment_terms: CREDIT_NOTE_TERMS.to_string(),
        payment_reference: invoice_number,
        notes: Some(format!(
            "Credit note for invoice {}",
            original.invoice_number
        )),
        related_invoice_id: Some(original_id.to_string()),
        company: original.company.clone(),
        created_at: issued_at,
        updated_at: issued_at,
    };

    let id = store.create(&credit).await?;
    credit.id = Some(id);
    Ok(credit)
}

fn negate_line(line: &LineItem) -> LineItem {
    LineItem {
        id: format!("{}-cn", line.id),
        description: line.description.clone(),
        quantity: line.quantity,
        unit_price: -line.unit_price,
        total_price: -line.total_price,
        vat_rate: line.vat_rate,
        vat_amount: -line.vat_amount,
        service_type: line.service_type,
        official_fee: line.official_fee.map(|fee| -fee),
        service_fee: line.service_fee.map(|fee| -fee),
    }
}
