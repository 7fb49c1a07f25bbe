//! Hardcoded fallback prices and ancillary fees.
//!
//! Last tier of the price resolver: when no administered rule can be
//! read, these values keep invoicing available. All amounts in SEK.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::ServiceType;

/// Express handling surcharge, per order.
pub const EXPRESS_FEE: Decimal = dec!(500);

/// Scanned copies, per document.
pub const SCANNED_COPY_FEE: Decimal = dec!(200);

/// Document pickup, per order.
pub const PICKUP_FEE: Decimal = dec!(450);

/// Premium pickup (express courier), per order.
pub const PREMIUM_PICKUP_FEE: Decimal = dec!(650);

/// Fallback fee pair for a service: (official fee per document, flat
/// service fee). Total for every service type, so the resolver's last
/// tier can never miss.
pub fn fallback_fees(service_type: ServiceType) -> (Decimal, Decimal) {
    match service_type {
        ServiceType::Apostille => (dec!(440), dec!(999)),
        ServiceType::Notarization => (dec!(320), dec!(999)),
        ServiceType::Chamber => (dec!(799), dec!(1199)),
        ServiceType::Embassy => (dec!(1500), dec!(1199)),
        ServiceType::Ud => (dec!(750), dec!(999)),
        // Translation is priced on request; only the handling fee is known.
        ServiceType::Translation => (Decimal::ZERO, dec!(999)),
    }
}
