//! Pricing rules, hardcoded fallbacks, and the ordered price resolver.
//!
//! Resolution is an explicit chain: exact country + service rule, then
//! the issuer's home-country rule, then a hardcoded table that always
//! answers. A data-entry gap can therefore never block invoicing.

mod fallback;
mod resolve;
mod rules;

pub use fallback::*;
pub use resolve::*;
pub use rules::*;
