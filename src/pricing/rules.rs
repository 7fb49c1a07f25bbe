use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{ServiceType, StoreError};

/// Administered fee schedule for one country + service combination.
///
/// Either both fee components are present (official government fee plus
/// handling service fee, taxed independently) or `base_price` alone is
/// authoritative. When both components exist, `base_price` is their sum
/// and exists for display purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRule {
    /// ISO 3166-1 alpha-2 destination country.
    pub country_code: String,
    pub service_type: ServiceType,
    /// Official fee charged by the authority, per document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_fee: Option<Decimal>,
    /// Flat handling fee per order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_fee: Option<Decimal>,
    /// Total price; authoritative when the components are absent.
    pub base_price: Decimal,
    pub currency: String,
    pub is_active: bool,
    /// Standard processing time in days, maintained by administrators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_days: Option<u32>,
}

impl PricingRule {
    /// Build a split-fee rule. `base_price` is derived from the
    /// components so the display invariant cannot drift.
    pub fn split(
        country_code: impl Into<String>,
        service_type: ServiceType,
        official_fee: Decimal,
        service_fee: Decimal,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            service_type,
            official_fee: Some(official_fee),
            service_fee: Some(service_fee),
            base_price: official_fee + service_fee,
            currency: "SEK".into(),
            is_active: true,
            processing_days: None,
        }
    }

    /// Build a flat-price rule without fee components.
    pub fn flat(
        country_code: impl Into<String>,
        service_type: ServiceType,
        base_price: Decimal,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            service_type,
            official_fee: None,
            service_fee: None,
            base_price,
            currency: "SEK".into(),
            is_active: true,
            processing_days: None,
        }
    }

    pub fn with_processing_days(mut self, days: u32) -> Self {
        self.processing_days = Some(days);
        self
    }

    /// Rule key as used by the store ("SE_apostille").
    pub fn key(&self) -> String {
        format!(
            "{}_{}",
            self.country_code.to_uppercase(),
            self.service_type.code()
        )
    }
}

/// Read-only lookup into the administered pricing rules.
///
/// The engine never mutates rules; administrators maintain them
/// out-of-band. `Ok(None)` means no rule exists for the combination.
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn rule(
        &self,
        country_code: &str,
        service_type: ServiceType,
    ) -> Result<Option<PricingRule>, StoreError>;
}

#[async_trait]
impl<T: RuleStore + ?Sized> RuleStore for std::sync::Arc<T> {
    async fn rule(
        &self,
        country_code: &str,
        service_type: ServiceType,
    ) -> Result<Option<PricingRule>, StoreError> {
        (**self).rule(country_code, service_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn split_derives_base_price() {
        let rule = PricingRule::split("SE", ServiceType::Apostille, dec!(795), dec!(100));
        assert_eq!(rule.base_price, dec!(895));
        assert_eq!(rule.key(), "SE_apostille");
    }

    #[test]
    fn flat_has_no_components() {
        let rule = PricingRule::flat("SE", ServiceType::Translation, dec!(1450));
        assert!(rule.official_fee.is_none());
        assert!(rule.service_fee.is_none());
        assert_eq!(rule.base_price, dec!(1450));
    }
}
