use super::error::ValidationError;
use super::types::{CustomerInfo, Order};

/// Validate an order before invoicing. Returns all errors found, not
/// just the first.
pub fn validate_order(order: &Order) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if order.id.trim().is_empty() {
        errors.push(ValidationError::new("id", "order id must not be empty"));
    }

    for (i, svc) in order.services.iter().enumerate() {
        if svc.quantity == 0 {
            errors.push(ValidationError::new(
                format!("services[{i}].quantity"),
                "quantity must be a positive integer",
            ));
        }
    }

    for (i, line) in order.pricing_breakdown.iter().enumerate() {
        if line.amount.is_sign_negative() && !line.amount.is_zero() {
            errors.push(ValidationError::new(
                format!("pricing_breakdown[{i}].amount"),
                format!("amount must not be negative, got {}", line.amount),
            ));
        }
    }

    validate_customer(&order.customer, &mut errors);

    errors
}

/// Required billing fields: an invoice without an addressable customer
/// cannot be issued.
fn validate_customer(customer: &CustomerInfo, errors: &mut Vec<ValidationError>) {
    let required = [
        ("customer.first_name", customer.first_name.as_str()),
        ("customer.last_name", customer.last_name.as_str()),
        ("customer.email", customer.email.as_str()),
        ("customer.address", customer.address.as_str()),
        ("customer.postal_code", customer.postal_code.as_str()),
        ("customer.city", customer.city.as_str()),
        ("customer.country_code", customer.country_code.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "required for invoicing"));
        }
    }

    if customer.country_code.trim().len() != 2 && !customer.country_code.trim().is_empty() {
        errors.push(ValidationError::new(
            "customer.country_code",
            "must be a 2-letter ISO 3166-1 code",
        ));
    }
}
