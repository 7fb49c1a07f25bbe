//! Customer jurisdiction classification for VAT treatment.

/// EU member state country codes (ISO 3166-1 alpha-2).
const EU_COUNTRIES: &[&str] = &[
    "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FR", "GR", "HR", "HU", "IE", "IT",
    "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK",
];

/// Check EU membership of an ISO 3166-1 alpha-2 country code.
pub fn is_eu_member(country: &str) -> bool {
    EU_COUNTRIES.contains(&country.to_uppercase().as_str())
}

/// Where a customer sits relative to the issuer's home country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jurisdiction {
    /// Same country as the issuer.
    Domestic,
    /// EU member state other than the issuer's.
    EuOther,
    /// Outside the EU.
    NonEu,
}

/// Classify a customer country against the issuer's home country.
pub fn classify(customer_country: &str, home_country: &str) -> Jurisdiction {
    let customer = customer_country.to_uppercase();
    if customer == home_country.to_uppercase() {
        Jurisdiction::Domestic
    } else if is_eu_member(&customer) {
        Jurisdiction::EuOther
    } else {
        Jurisdiction::NonEu
    }
}
