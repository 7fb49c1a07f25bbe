use rust_decimal::Decimal;
use tracing::warn;

use crate::pricing::{
    EXPRESS_FEE, PICKUP_FEE, PREMIUM_PICKUP_FEE, ResolvedPrice, SCANNED_COPY_FEE,
};

use super::error::InvoiceError;
use super::types::{BreakdownLine, BreakdownTag, LineItem, Order, PriceOverride, ServiceType};
use super::vat::{VatRate, round_money, vat_components};

/// Build line items from an order's services and resolved prices
/// (automatic mode).
///
/// `prices` is positionally aligned with `order.services`. Per service:
/// a split price emits an official-fee line (per document; zero-rated
/// only for government-fee services priced by an administered rule) and
/// a flat service-fee line (always standard-rated); a flat price emits a
/// single line. Ancillary lines follow in fixed order, then breakdown
/// entries tagged as return or premium delivery. When `zero_rated`,
/// every line is rewritten to 0% VAT as a final pass.
pub fn build_automatic(
    order: &Order,
    prices: &[ResolvedPrice],
    zero_rated: bool,
) -> Result<Vec<LineItem>, InvoiceError> {
    if prices.len() != order.services.len() {
        return Err(InvoiceError::Validation(format!(
            "resolved {} prices for {} services",
            prices.len(),
            order.services.len()
        )));
    }

    let mut items = Vec::new();
    let mut ids = LineIds::default();

    for (svc, price) in order.services.iter().zip(prices) {
        let name = svc.service_type.display_name();
        if let (Some(official), Some(fee)) = (price.official_fee, price.service_fee) {
            // Fallback-tier prices are estimates; the official-fee
            // zero-rating only applies to administered rules.
            let official_rate = if svc.service_type.is_government_fee() && !price.is_fallback() {
                VatRate::Zero
            } else {
                VatRate::Standard
            };
            items.push(make_line(
                ids.next(),
                format!("{name} - official fee"),
                svc.quantity,
                official,
                official_rate,
                Some(svc.service_type),
                Some(official),
                Some(fee),
            ));
            // The service fee is flat per order, independent of quantity.
            items.push(make_line(
                ids.next(),
                format!("Service fee ({name})"),
                1,
                fee,
                VatRate::Standard,
                Some(svc.service_type),
                Some(official),
                Some(fee),
            ));
        } else {
            let rate = if svc.service_type.is_government_fee() && !price.is_fallback() {
                VatRate::Zero
            } else {
                VatRate::Standard
            };
            items.push(make_line(
                ids.next(),
                name.to_string(),
                svc.quantity,
                price.base_price,
                rate,
                Some(svc.service_type),
                None,
                None,
            ));
        }
    }

    if order.scanned_copies {
        items.push(make_line(
            ids.next(),
            "Scanned copies".to_string(),
            order.document_count(),
            SCANNED_COPY_FEE,
            VatRate::Standard,
            None,
            None,
            None,
        ));
    }
    if order.pickup_service {
        items.push(make_line(
            ids.next(),
            "Document pickup service".to_string(),
            1,
            PICKUP_FEE,
            VatRate::Standard,
            None,
            None,
            None,
        ));
    }
    if order.expedited {
        items.push(make_line(
            ids.next(),
            "Express processing".to_string(),
            1,
            EXPRESS_FEE,
            VatRate::Standard,
            None,
            None,
            None,
        ));
    }
    if order.premium_pickup {
        items.push(make_line(
            ids.next(),
            "Premium pickup".to_string(),
            1,
            PREMIUM_PICKUP_FEE,
            VatRate::Standard,
            None,
            None,
            None,
        ));
    }

    for line in &order.pricing_breakdown {
        if matches!(
            line.tag,
            BreakdownTag::ReturnService | BreakdownTag::PremiumDelivery
        ) {
            items.push(make_line(
                ids.next(),
                line.description.clone(),
                1,
                line.amount,
                VatRate::Standard,
                None,
                None,
                None,
            ));
        }
    }

    if zero_rated {
        zero_rate_all(&mut items);
    }

    Ok(items)
}

/// Build line items from admin price overrides (override mode).
///
/// Overrides apply positionally to `order.pricing_breakdown`; each is a
/// sparse correction and the set is handled exhaustively. Excluded and
/// non-positive lines are omitted. Lines without an explicit rate get
/// 0% when the customer is zero-rated, 0% when they are official
/// government-fee lines, and the standard rate otherwise. Adjustment
/// entries append as signed free-form lines, skipping zero amounts.
pub fn build_with_overrides(
    order: &Order,
    overrides: &[PriceOverride],
    zero_rated: bool,
) -> Result<Vec<LineItem>, InvoiceError> {
    struct Slot {
        include: bool,
        net: Decimal,
        rate: Option<VatRate>,
    }

    let mut slots: Vec<Slot> = order
        .pricing_breakdown
        .iter()
        .map(|line| Slot {
            include: true,
            net: line.amount,
            rate: None,
        })
        .collect();
    let mut adjustments: Vec<(&str, Decimal)> = Vec::new();

    for o in overrides {
        match o {
            PriceOverride::Exclude { index } => match slots.get_mut(*index) {
                Some(slot) => slot.include = false,
                None => warn!(index, "exclude override out of range, ignored"),
            },
            PriceOverride::Amount { index, net } => match slots.get_mut(*index) {
                Some(slot) => slot.net = *net,
                None => warn!(index, "amount override out of range, ignored"),
            },
            PriceOverride::Rate { index, rate } => match slots.get_mut(*index) {
                Some(slot) => slot.rate = Some(*rate),
                None => warn!(index, "rate override out of range, ignored"),
            },
            PriceOverride::Adjustment {
                description,
                amount,
            } => adjustments.push((description.as_str(), *amount)),
        }
    }

    let mut items = Vec::new();
    let mut ids = LineIds::default();

    for (slot, line) in slots.iter().zip(&order.pricing_breakdown) {
        if !slot.include || slot.net <= Decimal::ZERO {
            continue;
        }
        let rate = slot
            .rate
            .unwrap_or_else(|| default_override_rate(line, zero_rated));
        items.push(make_line(
            ids.next(),
            line.description.clone(),
            1,
            slot.net,
            rate,
            breakdown_service(line),
            None,
            None,
        ));
    }

    for (description, amount) in adjustments {
        if amount.is_zero() {
            continue;
        }
        let rate = if zero_rated {
            VatRate::Zero
        } else {
            VatRate::Standard
        };
        items.push(make_line(
            ids.next(),
            description.to_string(),
            1,
            amount,
            rate,
            None,
            None,
            None,
        ));
    }

    Ok(items)
}

/// Rewrite every line to 0% VAT and recompute totals without tax. Run
/// as an overriding final pass for reverse-charge and export invoices.
pub fn zero_rate_all(items: &mut [LineItem]) {
    for item in items {
        let net = item.unit_price * Decimal::from(item.quantity);
        item.vat_rate = VatRate::Zero;
        item.vat_amount = Decimal::ZERO;
        item.total_price = round_money(net);
    }
}

/// Default VAT rate for an override line without an explicit rate:
/// official government-fee lines (label match + government service tag)
/// are zero-rated, everything else is standard.
fn default_override_rate(line: &BreakdownLine, zero_rated: bool) -> VatRate {
    if zero_rated {
        return VatRate::Zero;
    }
    let label = line.description.to_lowercase();
    let official_label = label.contains("official") || label.contains("officiell");
    if official_label
        && matches!(line.tag, BreakdownTag::Service(svc) if svc.is_government_fee())
    {
        VatRate::Zero
    } else {
        VatRate::Standard
    }
}

fn breakdown_service(line: &BreakdownLine) -> Option<ServiceType> {
    match line.tag {
        BreakdownTag::Service(svc) => Some(svc),
        _ => None,
    }
}

#[derive(Default)]
struct LineIds(u32);

impl LineIds {
    fn next(&mut self) -> String {
        self.0 += 1;
        self.0.to_string()
    }
}

#[allow(clippy::too_many_arguments)]
fn make_line(
    id: String,
    description: String,
    quantity: u32,
    unit_price: Decimal,
    vat_rate: VatRate,
    service_type: Option<ServiceType>,
    official_fee: Option<Decimal>,
    service_fee: Option<Decimal>,
) -> LineItem {
    let net = unit_price * Decimal::from(quantity);
    let calc = vat_components(net, vat_rate);
    LineItem {
        id,
        description,
        quantity,
        unit_price,
        total_price: calc.gross_amount,
        vat_rate,
        vat_amount: calc.vat_amount,
        service_type,
        official_fee,
        service_fee,
    }
}

impl Order {
    /// Number of physical documents on the order. Service quantities all
    /// refer to the same document set, so the largest one is the count.
    pub fn document_count(&self) -> u32 {
        self.services
            .iter()
            .map(|s| s.quantity)
            .max()
            .unwrap_or(1)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CustomerInfo, OrderedService};
    use crate::pricing::PriceSource;
    use rust_decimal_macros::dec;

    fn customer() -> CustomerInfo {
        CustomerInfo {
            first_name: "Anna".into(),
            last_name: "Lind".into(),
            email: "anna@example.se".into(),
            phone: "070-0000000".into(),
            address: "Storgatan 1".into(),
            postal_code: "111 22".into(),
            city: "Stockholm".into(),
            country_code: "SE".into(),
            company_name: None,
            org_number: None,
            vat_number: None,
        }
    }

    fn order(services: Vec<OrderedService>) -> Order {
        Order {
            id: "order_1".into(),
            order_number: None,
            country_code: "SE".into(),
            services,
            customer: customer(),
            expedited: false,
            scanned_copies: false,
            pickup_service: false,
            premium_pickup: false,
            pricing_breakdown: Vec::new(),
            price_overrides: None,
        }
    }

    fn split_price(official: Decimal, service: Decimal) -> ResolvedPrice {
        ResolvedPrice {
            source: PriceSource::Exact,
            official_fee: Some(official),
            service_fee: Some(service),
            base_price: official + service,
        }
    }

    #[test]
    fn split_price_emits_two_lines() {
        let ord = order(vec![OrderedService {
            service_type: ServiceType::Apostille,
            quantity: 1,
        }]);
        let items =
            build_automatic(&ord, &[split_price(dec!(795), dec!(100))], false).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "Apostille - official fee");
        assert_eq!(items[0].vat_rate, VatRate::Standard);
        assert_eq!(items[0].total_price, dec!(993.75));
        assert_eq!(items[1].description, "Service fee (Apostille)");
        assert_eq!(items[1].total_price, dec!(125.00));
    }

    #[test]
    fn service_fee_is_quantity_independent() {
        let ord = order(vec![OrderedService {
            service_type: ServiceType::Apostille,
            quantity: 3,
        }]);
        let items =
            build_automatic(&ord, &[split_price(dec!(440), dec!(999))], false).unwrap();
        // Official fee scales with documents, the service fee does not.
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].unit_price, dec!(440));
        assert_eq!(items[1].quantity, 1);
        assert_eq!(items[1].unit_price, dec!(999));
    }

    #[test]
    fn government_fee_zero_rated_on_administered_rule() {
        let ord = order(vec![OrderedService {
            service_type: ServiceType::Ud,
            quantity: 1,
        }]);
        let items =
            build_automatic(&ord, &[split_price(dec!(750), dec!(100))], false).unwrap();
        assert_eq!(items[0].vat_rate, VatRate::Zero);
        assert_eq!(items[0].total_price, dec!(750.00));
        assert_eq!(items[1].vat_rate, VatRate::Standard);
    }

    #[test]
    fn fallback_price_stays_standard_rated() {
        let ord = order(vec![OrderedService {
            service_type: ServiceType::Ud,
            quantity: 1,
        }]);
        let price = ResolvedPrice {
            source: PriceSource::Fallback,
            official_fee: Some(dec!(750)),
            service_fee: Some(dec!(999)),
            base_price: dec!(1749),
        };
        let items = build_automatic(&ord, &[price], false).unwrap();
        assert_eq!(items[0].vat_rate, VatRate::Standard);
    }

    #[test]
    fn flat_price_single_line() {
        let ord = order(vec![OrderedService {
            service_type: ServiceType::Translation,
            quantity: 2,
        }]);
        let price = ResolvedPrice {
            source: PriceSource::Exact,
            official_fee: None,
            service_fee: None,
            base_price: dec!(1450),
        };
        let items = build_automatic(&ord, &[price], false).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Certified translation");
        assert_eq!(items[0].quantity, 2);
        // 2900 net + 725 VAT
        assert_eq!(items[0].total_price, dec!(3625.00));
    }

    #[test]
    fn ancillary_lines_in_fixed_order() {
        let mut ord = order(vec![OrderedService {
            service_type: ServiceType::Apostille,
            quantity: 2,
        }]);
        ord.scanned_copies = true;
        ord.pickup_service = true;
        ord.expedited = true;
        ord.premium_pickup = true;
        ord.pricing_breakdown.push(BreakdownLine {
            tag: BreakdownTag::ReturnService,
            description: "Return shipping (DHL)".into(),
            amount: dec!(180),
        });
        let items =
            build_automatic(&ord, &[split_price(dec!(795), dec!(100))], false).unwrap();
        let descriptions: Vec<&str> = items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Apostille - official fee",
                "Service fee (Apostille)",
                "Scanned copies",
                "Document pickup service",
                "Express processing",
                "Premium pickup",
                "Return shipping (DHL)",
            ]
        );
        // Scanned copies follow the document count.
        assert_eq!(items[2].quantity, 2);
        assert_eq!(items[2].unit_price, dec!(200));
    }

    #[test]
    fn zero_rating_pass_rewrites_everything() {
        let ord = order(vec![OrderedService {
            service_type: ServiceType::Apostille,
            quantity: 1,
        }]);
        let items =
            build_automatic(&ord, &[split_price(dec!(795), dec!(100))], true).unwrap();
        for item in &items {
            assert_eq!(item.vat_rate, VatRate::Zero);
            assert_eq!(item.vat_amount, Decimal::ZERO);
        }
        assert_eq!(items[0].total_price, dec!(795.00));
        assert_eq!(items[1].total_price, dec!(100.00));
    }

    #[test]
    fn no_services_is_not_an_error() {
        let mut ord = order(Vec::new());
        ord.pickup_service = true;
        let items = build_automatic(&ord, &[], false).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Document pickup service");
    }

    fn breakdown() -> Vec<BreakdownLine> {
        vec![
            BreakdownLine {
                tag: BreakdownTag::Service(ServiceType::Embassy),
                description: "Embassy legalization - official fee".into(),
                amount: dec!(1500),
            },
            BreakdownLine {
                tag: BreakdownTag::Service(ServiceType::Embassy),
                description: "Service fee (Embassy legalization)".into(),
                amount: dec!(1199),
            },
            BreakdownLine {
                tag: BreakdownTag::ReturnService,
                description: "Return shipping".into(),
                amount: dec!(180),
            },
        ]
    }

    #[test]
    fn override_defaults_zero_rate_official_government_lines() {
        let mut ord = order(Vec::new());
        ord.pricing_breakdown = breakdown();
        let items = build_with_overrides(&ord, &[], false).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].vat_rate, VatRate::Zero);
        assert_eq!(items[1].vat_rate, VatRate::Standard);
        assert_eq!(items[2].vat_rate, VatRate::Standard);
    }

    #[test]
    fn override_exclude_and_amount() {
        let mut ord = order(Vec::new());
        ord.pricing_breakdown = breakdown();
        let overrides = vec![
            PriceOverride::Exclude { index: 2 },
            PriceOverride::Amount {
                index: 1,
                net: dec!(999),
            },
        ];
        let items = build_with_overrides(&ord, &overrides, false).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].unit_price, dec!(999));
        assert_eq!(items[1].total_price, dec!(1248.75));
    }

    #[test]
    fn override_rate_wins_over_default() {
        let mut ord = order(Vec::new());
        ord.pricing_breakdown = breakdown();
        let overrides = vec![PriceOverride::Rate {
            index: 0,
            rate: VatRate::Standard,
        }];
        let items = build_with_overrides(&ord, &overrides, false).unwrap();
        assert_eq!(items[0].vat_rate, VatRate::Standard);
        assert_eq!(items[0].total_price, dec!(1875.00));
    }

    #[test]
    fn override_skips_non_positive_amounts() {
        let mut ord = order(Vec::new());
        ord.pricing_breakdown = breakdown();
        let overrides = vec![PriceOverride::Amount {
            index: 0,
            net: Decimal::ZERO,
        }];
        let items = build_with_overrides(&ord, &overrides, false).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn adjustments_append_signed_lines() {
        let mut ord = order(Vec::new());
        ord.pricing_breakdown = breakdown();
        let overrides = vec![
            PriceOverride::Adjustment {
                description: "Goodwill discount".into(),
                amount: dec!(-200),
            },
            PriceOverride::Adjustment {
                description: "No-op".into(),
                amount: Decimal::ZERO,
            },
        ];
        let items = build_with_overrides(&ord, &overrides, false).unwrap();
        assert_eq!(items.len(), 4);
        let adj = items.last().unwrap();
        assert_eq!(adj.description, "Goodwill discount");
        assert_eq!(adj.vat_amount, dec!(-50.00));
        assert_eq!(adj.total_price, dec!(-250.00));
    }

    #[test]
    fn out_of_range_override_ignored() {
        let mut ord = order(Vec::new());
        ord.pricing_breakdown = breakdown();
        let overrides = vec![PriceOverride::Exclude { index: 99 }];
        let items = build_with_overrides(&ord, &overrides, false).unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn zero_rated_customer_overrides_all_default_rates() {
        let mut ord = order(Vec::new());
        ord.pricing_breakdown = breakdown();
        let overrides = vec![PriceOverride::Adjustment {
            description: "Extra courier".into(),
            amount: dec!(100),
        }];
        let items = build_with_overrides(&ord, &overrides, true).unwrap();
        for item in &items {
            assert_eq!(item.vat_rate, VatRate::Zero);
            assert_eq!(item.vat_amount, Decimal::ZERO);
        }
    }
}
