use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::vat::VatRate;

/// Legalization services offered on orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Apostille,
    Notarization,
    Embassy,
    /// Ministry of Foreign Affairs legalization.
    Ud,
    Translation,
    Chamber,
}

impl ServiceType {
    /// Stable identifier used in rule keys and persisted records.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Apostille => "apostille",
            Self::Notarization => "notarization",
            Self::Embassy => "embassy",
            Self::Ud => "ud",
            Self::Translation => "translation",
            Self::Chamber => "chamber",
        }
    }

    /// Parse from a stable identifier.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "apostille" => Some(Self::Apostille),
            "notarization" => Some(Self::Notarization),
            "embassy" => Some(Self::Embassy),
            "ud" => Some(Self::Ud),
            "translation" => Some(Self::Translation),
            "chamber" => Some(Self::Chamber),
            _ => None,
        }
    }

    /// Customer-facing service name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Apostille => "Apostille",
            Self::Notarization => "Notarization",
            Self::Embassy => "Embassy legalization",
            Self::Ud => "Ministry of Foreign Affairs legalization",
            Self::Translation => "Certified translation",
            Self::Chamber => "Chamber of Commerce legalization",
        }
    }

    /// Whether this service's official fee is a government fee and
    /// therefore zero-rated on domestic invoices. Only the Ministry of
    /// Foreign Affairs and embassy fees qualify.
    pub fn is_government_fee(&self) -> bool {
        matches!(self, Self::Ud | Self::Embassy)
    }
}

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
    /// Terminal status of a mirror invoice created by the credit-note
    /// generator; never reached by a status transition.
    CreditNote,
}

/// A single invoice line.
///
/// `total_price` is gross: `round(unit_price × quantity + vat_amount, 2)`
/// with `vat_amount = round(unit_price × quantity × rate, 2)`. Lines are
/// immutable once the invoice leaves draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique within the invoice ("1", "2", ...; credit-note lines carry
    /// a suffix).
    pub id: String,
    pub description: String,
    pub quantity: u32,
    /// Net price per unit, 2-decimal precision.
    pub unit_price: Decimal,
    /// Gross line total including VAT.
    pub total_price: Decimal,
    pub vat_rate: VatRate,
    pub vat_amount: Decimal,
    /// Tag back to the originating service, if any.
    pub service_type: Option<ServiceType>,
    /// Original per-unit official fee, kept for audit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_fee: Option<Decimal>,
    /// Original flat service fee, kept for audit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_fee: Option<Decimal>,
}

/// Customer billing identity as captured on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    /// ISO 3166-1 alpha-2; drives jurisdiction classification.
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
}

impl CustomerInfo {
    /// Customer full name for display.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// A company customer has a non-blank company name.
    pub fn is_company(&self) -> bool {
        self.company_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

/// Fixed issuer identity, injected into the assembler and renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    /// Issuer home country; the pricing domestic default and the VAT
    /// domestic jurisdiction.
    pub country_code: String,
    pub org_number: String,
    pub vat_number: String,
    pub phone: String,
    pub email: String,
    /// Bankgiro number printed in the payment instructions.
    pub bankgiro: String,
}

/// A complete invoice record as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Store-assigned document id; `None` until persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// "INV-{year}-{6-digit}" (or the timestamp fallback form).
    pub invoice_number: String,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    pub customer: CustomerInfo,
    pub line_items: Vec<LineItem>,
    /// Σ line total_price. VAT-inclusive by construction.
    pub subtotal: Decimal,
    /// Σ line vat_amount.
    pub vat_total: Decimal,
    /// Always equals `subtotal`; kept as its own field because it is the
    /// amount due and the one shown largest on the document.
    pub total_amount: Decimal,
    /// Issuer operating currency, "SEK".
    pub currency: String,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: InvoiceStatus,
    pub payment_terms: String,
    /// Defaults to the invoice number.
    pub payment_reference: String,
    /// Legal notices (reverse charge, export) and credit-note linkage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Structured back-reference from a credit note to its original.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_invoice_id: Option<String>,
    pub company: CompanyInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Whether every line is zero-rated.
    pub fn is_fully_zero_rated(&self) -> bool {
        !self.line_items.is_empty()
            && self.line_items.iter().all(|l| l.vat_rate == VatRate::Zero)
    }

    /// Whether the invoice mixes zero-rated and taxed lines.
    pub fn has_mixed_rates(&self) -> bool {
        let zero = self
            .line_items
            .iter()
            .filter(|l| l.vat_rate == VatRate::Zero)
            .count();
        zero > 0 && zero < self.line_items.len()
    }
}

/// One service requested on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedService {
    pub service_type: ServiceType,
    /// Number of documents; must be positive.
    pub quantity: u32,
}

/// Tag on an order-level pricing breakdown entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownTag {
    Service(ServiceType),
    ReturnService,
    PremiumDelivery,
    Other,
}

/// One entry of the order's pricing breakdown, as computed by the order
/// wizard. The admin override mode applies corrections positionally
/// against this list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub tag: BreakdownTag,
    pub description: String,
    /// Net amount for the whole entry.
    pub amount: Decimal,
}

/// A sparse admin correction applied to the pricing breakdown, plus
/// free-form adjustment lines. Indexes address breakdown positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PriceOverride {
    /// Drop the breakdown line entirely.
    Exclude { index: usize },
    /// Replace the line's net amount.
    Amount { index: usize, net: Decimal },
    /// Replace the line's VAT rate.
    Rate { index: usize, rate: VatRate },
    /// Append a free-form signed adjustment line.
    Adjustment { description: String, amount: Decimal },
}

/// The subset of an order the invoice engine consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    /// Destination jurisdiction the documents are legalized for.
    pub country_code: String,
    pub services: Vec<OrderedService>,
    pub customer: CustomerInfo,
    /// Express processing requested.
    pub expedited: bool,
    /// Scanned copies of each document requested.
    pub scanned_copies: bool,
    /// Document pickup booked.
    pub pickup_service: bool,
    /// Premium (express courier) pickup booked.
    pub premium_pickup: bool,
    /// Wizard-computed pricing breakdown; source list for admin overrides
    /// and for shipping/delivery line items.
    pub pricing_breakdown: Vec<BreakdownLine>,
    /// Admin price corrections; their presence switches the line-item
    /// builder into override mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_overrides: Option<Vec<PriceOverride>>,
}
