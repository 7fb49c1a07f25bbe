//! # fakturera
//!
//! Invoice and pricing engine for a document-legalization ordering
//! platform: deterministic VAT-compliant line items from ordered
//! services, admin price overrides, sequential invoice numbering,
//! credit notes, and HTML/PDF rendering.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating
//! point. Persistence is behind async store traits; pricing gaps and
//! store outages degrade to fallbacks instead of blocking invoicing.
//!
//! ## Quick Start
//!
//! ```rust
//! use fakturera::core::{VatRate, calculate_vat, format_invoice_number};
//! use rust_decimal_macros::dec;
//!
//! let vat = calculate_vat(dec!(795), VatRate::Standard).unwrap();
//! assert_eq!(vat.vat_amount, dec!(198.75));
//! assert_eq!(vat.gross_amount, dec!(993.75));
//!
//! assert_eq!(format_invoice_number(2024, 17), "INV-2024-000017");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Pricing, VAT, assembly, numbering, credit notes, stores |
//! | `render` | Deterministic HTML rendering and the PDF content model |
//! | `pdf` | PDF serialization via `lopdf` |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod pricing;

#[cfg(feature = "core")]
pub mod store;

#[cfg(feature = "render")]
pub mod render;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
