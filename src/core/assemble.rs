use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::pricing::{PriceResolver, ResolvedPrice, RuleStore};

use super::countries::{Jurisdiction, classify};
use super::error::{InvoiceError, validation_failure};
use super::lineitems::{build_automatic, build_with_overrides};
use super::numbering::{CounterStore, InvoiceSequencer, fallback_invoice_number};
use super::types::{CompanyInfo, CustomerInfo, Invoice, InvoiceStatus, Order};
use super::validation::validate_order;

/// Fixed payment term applied to every invoice.
pub const PAYMENT_TERM_DAYS: i64 = 30;

/// Default payment terms text.
pub const DEFAULT_PAYMENT_TERMS: &str = "Payment within 30 days";

/// Issuer operating currency.
pub const CURRENCY: &str = "SEK";

const REVERSE_CHARGE_NOTE: &str =
    "Reverse charge: VAT to be accounted for by the recipient under Article 196 of Council Directive 2006/112/EC.";

const EXPORT_NOTE: &str =
    "Export of services: supplied outside the EU, outside the scope of Swedish VAT.";

/// VAT treatment of an invoice, determined from the customer's
/// jurisdiction and company status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VatTreatment {
    /// Normal Swedish VAT.
    Domestic,
    /// Foreign company in another EU member state; buyer accounts for VAT.
    ReverseCharge,
    /// Foreign company outside the EU; zero-rated export of services.
    Export,
}

impl VatTreatment {
    /// Whether every line of the invoice is forced to 0% VAT.
    pub fn zero_rates(&self) -> bool {
        !matches!(self, Self::Domestic)
    }

    /// The legally required notice attached to the invoice, if any.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::Domestic => None,
            Self::ReverseCharge => Some(REVERSE_CHARGE_NOTE),
            Self::Export => Some(EXPORT_NOTE),
        }
    }
}

/// Classify the VAT treatment for a customer against the issuer's home
/// country. Only foreign companies qualify for zero-rating; foreign
/// private customers pay Swedish VAT.
pub fn classify_treatment(customer: &CustomerInfo, home_country: &str) -> VatTreatment {
    let jurisdiction = classify(&customer.country_code, home_country);
    let foreign_company = jurisdiction != Jurisdiction::Domestic && customer.is_company();
    match (jurisdiction, foreign_company) {
        (Jurisdiction::EuOther, true) => VatTreatment::ReverseCharge,
        (Jurisdiction::NonEu, true) => VatTreatment::Export,
        _ => VatTreatment::Domestic,
    }
}

/// Turns orders into draft invoices.
///
/// Holds the injected issuer identity, the price resolver, and the
/// number sequencer. The issuance instant is a parameter; every date
/// field and the numbering fallback derive from it.
pub struct InvoiceAssembler<R, C> {
    company: CompanyInfo,
    resolver: PriceResolver<R>,
    sequencer: InvoiceSequencer<C>,
}

impl<R: RuleStore, C: CounterStore> InvoiceAssembler<R, C> {
    pub fn new(company: CompanyInfo, rules: R, counter: C) -> Self {
        let home = company.country_code.clone();
        Self {
            company,
            resolver: PriceResolver::new(rules, home),
            sequencer: InvoiceSequencer::new(counter),
        }
    }

    pub fn company(&self) -> &CompanyInfo {
        &self.company
    }

    /// Assemble a draft invoice for an order.
    ///
    /// Line construction is strictly sequential in the order services
    /// were requested; this fixes the display order. Pricing gaps
    /// degrade to fallback prices, and a sequencer failure degrades to a
    /// timestamp-derived number, so only validation can fail here.
    ///
    /// # Errors
    ///
    /// [`InvoiceError::Validation`] for malformed orders.
    pub async fn assemble(
        &self,
        order: &Order,
        issued_at: DateTime<Utc>,
    ) -> Result<Invoice, InvoiceError> {
        let errors = validate_order(order);
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }

        let treatment = classify_treatment(&order.customer, &self.company.country_code);
        let zero_rated = treatment.zero_rates();

        let line_items = match &order.price_overrides {
            Some(overrides) => build_with_overrides(order, overrides, zero_rated)?,
            None => {
                let mut prices: Vec<ResolvedPrice> = Vec::with_capacity(order.services.len());
                for svc in &order.services {
                    prices.push(
                        self.resolver
                            .resolve(&order.country_code, svc.service_type)
                            .await,
                    );
                }
                build_automatic(order, &prices, zero_rated)?
            }
        };

        let subtotal: Decimal = line_items.iter().map(|l| l.total_price).sum();
        let vat_total: Decimal = line_items.iter().map(|l| l.vat_amount).sum();

        let year = issued_at.year();
        let invoice_number = match self.sequencer.next_number(year).await {
            Ok(number) => number,
            Err(err) => {
                warn!(error = %err, "sequencer unavailable, using timestamp invoice number");
                fallback_invoice_number(year, issued_at.timestamp_millis())
            }
        };

        Ok(Invoice {
            id: None,
            invoice_number: invoice_number.clone(),
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            customer: order.customer.clone(),
            line_items,
            subtotal,
            vat_total,
            total_amount: subtotal,
            currency: CURRENCY.to_string(),
            issue_date: issued_at,
            due_date: issued_at + Duration::days(PAYMENT_TERM_DAYS),
            status: InvoiceStatus::Draft,
            payment_terms: DEFAULT_PAYMENT_TERMS.to_string(),
            payment_reference: invoice_number,
            notes: treatment.notice().map(str::to_string),
            related_invoice_id: None,
            company: self.company.clone(),
            created_at: issued_at,
            updated_at: issued_at,
        })
    }
}
