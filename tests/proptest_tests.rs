use proptest::prelude::*;
use rust_decimal::Decimal;

use fakturera::core::{VatRate, calculate_vat};

fn arb_net() -> impl Strategy<Value = Decimal> {
    // Net amounts up to 10M SEK with 2-decimal precision.
    (0i64..1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_rate() -> impl Strategy<Value = VatRate> {
    prop_oneof![
        Just(VatRate::Standard),
        Just(VatRate::Reduced),
        Just(VatRate::Zero),
    ]
}

proptest! {
    /// vat = round(net × rate, 2) and gross = round(net + vat, 2).
    #[test]
    fn vat_arithmetic_invariant(net in arb_net(), rate in arb_rate()) {
        let calc = calculate_vat(net, rate).unwrap();
        let expected_vat = (net * rate.fraction()).round_dp_with_strategy(
            2,
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        );
        prop_assert_eq!(calc.vat_amount, expected_vat);
        prop_assert_eq!(calc.gross_amount, net + expected_vat);
    }

    /// Re-deriving the net from gross / (1 + rate) recovers it to within
    /// rounding tolerance.
    #[test]
    fn net_recoverable_from_gross(net in arb_net(), rate in arb_rate()) {
        let calc = calculate_vat(net, rate).unwrap();
        let rederived = calc.gross_amount / (Decimal::ONE + rate.fraction());
        let diff = (rederived - net).abs();
        prop_assert!(diff <= Decimal::new(1, 2), "diff {} too large", diff);
    }

    /// VAT is never negative and gross is never below net.
    #[test]
    fn vat_bounds(net in arb_net(), rate in arb_rate()) {
        let calc = calculate_vat(net, rate).unwrap();
        prop_assert!(calc.vat_amount >= Decimal::ZERO);
        prop_assert!(calc.gross_amount >= net);
    }

    /// Zero rate is the identity on the net amount.
    #[test]
    fn zero_rate_is_identity(net in arb_net()) {
        let calc = calculate_vat(net, VatRate::Zero).unwrap();
        prop_assert_eq!(calc.vat_amount, Decimal::ZERO);
        prop_assert_eq!(calc.gross_amount, net);
    }
}
