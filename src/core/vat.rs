use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::InvoiceError;

/// Swedish VAT rates applicable to legalization invoicing.
///
/// The closed set mirrors what administrators can select: official
/// government fees are zero-rated, service fees carry the standard rate.
/// The reduced rate exists in Swedish VAT law but no current service
/// uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VatRate {
    /// 25%: standard rate for service fees.
    Standard,
    /// 12%: reduced rate, reserved and unused by current flows.
    Reduced,
    /// 0%: official/government fees, reverse charge, export.
    Zero,
}

impl VatRate {
    /// Rate as a fraction (0.25, 0.12, 0.00).
    pub fn fraction(&self) -> Decimal {
        match self {
            Self::Standard => dec!(0.25),
            Self::Reduced => dec!(0.12),
            Self::Zero => Decimal::ZERO,
        }
    }

    /// Rate as a whole percentage (25, 12, 0).
    pub fn percent(&self) -> u32 {
        match self {
            Self::Standard => 25,
            Self::Reduced => 12,
            Self::Zero => 0,
        }
    }

    /// Parse from a whole percentage as entered by administrators.
    pub fn from_percent(percent: u32) -> Option<Self> {
        match percent {
            25 => Some(Self::Standard),
            12 => Some(Self::Reduced),
            0 => Some(Self::Zero),
            _ => None,
        }
    }
}

/// Result of a VAT calculation on a net amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatCalculation {
    /// round(net × rate, 2), half-up.
    pub vat_amount: Decimal,
    /// round(net + vat_amount, 2).
    pub gross_amount: Decimal,
}

/// Round a monetary amount to 2 decimals, half away from zero.
pub(crate) fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// VAT and gross for a signed net amount. No sign validation; used
/// internally for adjustments and credit-note negation where negative
/// nets are legitimate.
pub(crate) fn vat_components(net: Decimal, rate: VatRate) -> VatCalculation {
    let vat_amount = round_money(net * rate.fraction());
    VatCalculation {
        vat_amount,
        gross_amount: round_money(net + vat_amount),
    }
}

/// Calculate VAT and gross total for a net amount.
///
/// `vat_amount = round(net × rate, 2)` half-up,
/// `gross_amount = round(net + vat_amount, 2)`.
///
/// # Errors
///
/// Returns [`InvoiceError::Validation`] for a negative net amount.
pub fn calculate_vat(net: Decimal, rate: VatRate) -> Result<VatCalculation, InvoiceError> {
    if net.is_sign_negative() && !net.is_zero() {
        return Err(InvoiceError::Validation(format!(
            "net amount must not be negative, got {net}"
        )));
    }
    Ok(vat_components(net, rate))
}
