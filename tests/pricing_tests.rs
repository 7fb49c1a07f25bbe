use async_trait::async_trait;
use rust_decimal_macros::dec;

use fakturera::core::{ServiceType, StoreError};
use fakturera::pricing::{PriceResolver, PriceSource, PricingRule, RuleStore};
use fakturera::store::MemoryRuleStore;

/// Rule store whose every lookup fails, simulating a store outage.
struct FailingRuleStore;

#[async_trait]
impl RuleStore for FailingRuleStore {
    async fn rule(
        &self,
        _country_code: &str,
        _service_type: ServiceType,
    ) -> Result<Option<PricingRule>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

// ---------------------------------------------------------------------------
// Resolver tiers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exact_rule_wins() {
    let rules = MemoryRuleStore::new();
    rules.upsert(PricingRule::split(
        "TH",
        ServiceType::Embassy,
        dec!(1395),
        dec!(100),
    ));
    rules.upsert(PricingRule::split(
        "SE",
        ServiceType::Embassy,
        dec!(999),
        dec!(50),
    ));

    let resolver = PriceResolver::new(rules, "SE");
    let price = resolver.resolve("TH", ServiceType::Embassy).await;
    assert_eq!(price.source, PriceSource::Exact);
    assert_eq!(price.official_fee, Some(dec!(1395)));
    assert_eq!(price.base_price, dec!(1495));
}

#[tokio::test]
async fn missing_destination_uses_domestic_default() {
    let rules = MemoryRuleStore::new();
    rules.upsert(PricingRule::split(
        "SE",
        ServiceType::Notarization,
        dec!(1200),
        dec!(100),
    ));

    let resolver = PriceResolver::new(rules, "SE");
    let price = resolver.resolve("EG", ServiceType::Notarization).await;
    assert_eq!(price.source, PriceSource::DomesticDefault);
    assert_eq!(price.base_price, dec!(1300));
}

#[tokio::test]
async fn empty_store_falls_back_to_hardcoded_table() {
    let resolver = PriceResolver::new(MemoryRuleStore::new(), "SE");
    let price = resolver.resolve("SE", ServiceType::Apostille).await;
    assert_eq!(price.source, PriceSource::Fallback);
    assert_eq!(price.official_fee, Some(dec!(440)));
    assert_eq!(price.service_fee, Some(dec!(999)));
    assert_eq!(price.base_price, dec!(1439));
}

#[tokio::test]
async fn store_outage_still_produces_a_price() {
    let resolver = PriceResolver::new(FailingRuleStore, "SE");
    for service in [
        ServiceType::Apostille,
        ServiceType::Notarization,
        ServiceType::Embassy,
        ServiceType::Ud,
        ServiceType::Translation,
        ServiceType::Chamber,
    ] {
        let price = resolver.resolve("IR", service).await;
        assert_eq!(price.source, PriceSource::Fallback);
        assert!(price.base_price > dec!(0));
    }
}

#[tokio::test]
async fn inactive_rule_is_skipped() {
    let rules = MemoryRuleStore::new();
    let mut rule = PricingRule::split("SE", ServiceType::Ud, dec!(1650), dec!(100));
    rule.is_active = false;
    rules.upsert(rule);

    let resolver = PriceResolver::new(rules, "SE");
    let price = resolver.resolve("SE", ServiceType::Ud).await;
    assert_eq!(price.source, PriceSource::Fallback);
}

#[tokio::test]
async fn flat_rule_resolves_without_components() {
    let rules = MemoryRuleStore::new();
    rules.upsert(PricingRule::flat("SE", ServiceType::Translation, dec!(1450)));

    let resolver = PriceResolver::new(rules, "SE");
    let price = resolver.resolve("SE", ServiceType::Translation).await;
    assert_eq!(price.source, PriceSource::Exact);
    assert!(!price.is_split());
    assert_eq!(price.base_price, dec!(1450));
}

#[tokio::test]
async fn country_codes_are_case_insensitive() {
    let rules = MemoryRuleStore::new();
    rules.upsert(PricingRule::split(
        "SE",
        ServiceType::Apostille,
        dec!(795),
        dec!(100),
    ));

    let resolver = PriceResolver::new(rules, "SE");
    let price = resolver.resolve("se", ServiceType::Apostille).await;
    assert_eq!(price.source, PriceSource::Exact);
}
