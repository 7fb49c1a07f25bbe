use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core::ServiceType;

use super::fallback::fallback_fees;
use super::rules::RuleStore;

/// Which resolver tier produced a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// Exact country + service rule.
    Exact,
    /// Rule for the issuer's home country.
    DomesticDefault,
    /// Hardcoded fallback table.
    Fallback,
}

/// A resolved price for one ordered service.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrice {
    pub source: PriceSource,
    /// Official fee per document, when the rule carries fee components.
    pub official_fee: Option<Decimal>,
    /// Flat service fee per order, when the rule carries fee components.
    pub service_fee: Option<Decimal>,
    pub base_price: Decimal,
}

impl ResolvedPrice {
    /// Whether the price splits into official + service fee lines.
    pub fn is_split(&self) -> bool {
        self.official_fee.is_some() && self.service_fee.is_some()
    }

    /// Whether the price came from the hardcoded last tier.
    pub fn is_fallback(&self) -> bool {
        self.source == PriceSource::Fallback
    }
}

/// Ordered price resolution: exact rule, then the home-country rule,
/// then the hardcoded table. The final tier is total, so resolution
/// never fails; store errors and misses degrade silently (logged) per
/// the never-block-invoicing policy.
pub struct PriceResolver<R> {
    rules: R,
    home_country: String,
}

impl<R: RuleStore> PriceResolver<R> {
    pub fn new(rules: R, home_country: impl Into<String>) -> Self {
        Self {
            rules,
            home_country: home_country.into(),
        }
    }

    pub async fn resolve(&self, country_code: &str, service_type: ServiceType) -> ResolvedPrice {
        if let Some(price) = self
            .tier(country_code, service_type, PriceSource::Exact)
            .await
        {
            return price;
        }

        if !country_code.eq_ignore_ascii_case(&self.home_country) {
            if let Some(price) = self
                .tier(&self.home_country, service_type, PriceSource::DomesticDefault)
                .await
            {
                warn!(
                    country = country_code,
                    service = service_type.code(),
                    "no pricing rule for destination, using domestic default"
                );
                return price;
            }
        }

        warn!(
            country = country_code,
            service = service_type.code(),
            "no pricing rule found, using hardcoded fallback price"
        );
        let (official_fee, service_fee) = fallback_fees(service_type);
        ResolvedPrice {
            source: PriceSource::Fallback,
            official_fee: Some(official_fee),
            service_fee: Some(service_fee),
            base_price: official_fee + service_fee,
        }
    }

    async fn tier(
        &self,
        country_code: &str,
        service_type: ServiceType,
        source: PriceSource,
    ) -> Option<ResolvedPrice> {
        match self.rules.rule(country_code, service_type).await {
            Ok(Some(rule)) if rule.is_active => {
                debug!(
                    country = country_code,
                    service = service_type.code(),
                    ?source,
                    "pricing rule resolved"
                );
                Some(ResolvedPrice {
                    source,
                    official_fee: rule.official_fee,
                    service_fee: rule.service_fee,
                    base_price: rule.base_price,
                })
            }
            Ok(_) => None,
            Err(err) => {
                warn!(
                    country = country_code,
                    service = service_type.code(),
                    error = %err,
                    "pricing rule lookup failed, falling through"
                );
                None
            }
        }
    }
}
