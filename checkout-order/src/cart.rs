use checkout_catalog::clamp_quantity;
use checkout_core::{CheckoutError, CheckoutResult, FieldViolation};
use checkout_shared::Masked;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::LazyLock;

use crate::models::Customer;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// Purchase intent as submitted by the checkout form.
///
/// Every field is optional on the wire so that missing input surfaces as a
/// validation violation rather than a body-parsing failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cart {
    #[serde(rename = "fullname", alias = "fullName")]
    pub full_name: String,
    pub address: Masked<String>,
    pub city: String,
    pub country: String,
    pub email: Masked<String>,
    #[serde(deserialize_with = "lenient_quantity")]
    pub quantity: Option<i64>,
    pub is_preorder: bool,
}

/// A cart that passed validation, with its quantity clamped into range.
#[derive(Debug, Clone)]
pub struct ValidCart {
    pub customer: Customer,
    pub quantity: u32,
    pub is_preorder: bool,
}

/// Accepts `2`, `2.0` and `"2"`. Fractions truncate; anything unreadable is
/// treated as absent and later defaults to one.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let quantity = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    };
    Ok(quantity)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

impl Cart {
    /// Validate every field and report all violations together.
    pub fn validate(&self) -> CheckoutResult<ValidCart> {
        let full_name = self.full_name.trim();
        let address = self.address.expose().trim();
        let city = self.city.trim();
        let country = self.country.trim();
        let email = self.email.expose().trim();

        let mut violations = Vec::new();
        if full_name.is_empty() {
            violations.push(FieldViolation::new("fullname", "Full name is required"));
        }
        if address.is_empty() {
            violations.push(FieldViolation::new("address", "Street address is required"));
        }
        if city.is_empty() {
            violations.push(FieldViolation::new("city", "City is required"));
        }
        if country.is_empty() {
            violations.push(FieldViolation::new("country", "Country is required"));
        }
        if email.is_empty() {
            violations.push(FieldViolation::new("email", "Email is required"));
        } else if !is_valid_email(email) {
            violations.push(FieldViolation::new("email", "Please enter a valid email address"));
        }

        if !violations.is_empty() {
            return Err(CheckoutError::ValidationError(violations));
        }

        let requested = self.quantity.unwrap_or(1);
        let quantity = clamp_quantity(requested);
        if quantity as i64 != requested {
            tracing::debug!("Clamped cart quantity {} to {}", requested, quantity);
        }

        Ok(ValidCart {
            customer: Customer {
                full_name: full_name.to_string(),
                address: Masked::from(address),
                city: city.to_string(),
                country: country.to_string(),
                email: Masked::from(email),
            },
            quantity,
            is_preorder: self.is_preorder,
        })
    }
}
