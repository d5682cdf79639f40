use serde::{Deserialize, Serialize};
use crate::shipping::{QuantityBand, ShippingZone};

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 99;

pub const PREORDER_UNIT_PRICE_CENTS: i64 = 9200;
pub const REGULAR_UNIT_PRICE_CENTS: i64 = 11500;
pub const PACKAGING_FEE_CENTS: i64 = 1000;

/// Clamp a raw, possibly out-of-range quantity into `[1, 99]`.
pub fn clamp_quantity(raw: i64) -> u32 {
    raw.clamp(MIN_QUANTITY as i64, MAX_QUANTITY as i64) as u32
}

/// Price breakdown of one cart, all in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub subtotal_cents: i64,
    pub packaging_fee_cents: i64,
    pub shipping_fee_cents: i64,
    pub total_cents: i64,
}

impl Pricing {
    /// True when the stored total still equals the sum of its parts.
    pub fn is_consistent(&self) -> bool {
        self.total_cents == self.subtotal_cents + self.packaging_fee_cents + self.shipping_fee_cents
    }
}

/// The one place cart state becomes money.
///
/// Pure and deterministic: the same `(quantity, country, is_preorder)` always
/// yields the same `Pricing`. Both order creation and the preview endpoints
/// go through this type.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn unit_price_cents(&self, is_preorder: bool) -> i64 {
        if is_preorder {
            PREORDER_UNIT_PRICE_CENTS
        } else {
            REGULAR_UNIT_PRICE_CENTS
        }
    }

    pub fn shipping_fee(&self, country: &str, quantity: u32) -> i64 {
        let quantity = quantity.clamp(MIN_QUANTITY, MAX_QUANTITY);
        ShippingZone::from_country(country).fee_cents(QuantityBand::from_quantity(quantity))
    }

    pub fn price(&self, quantity: u32, country: &str, is_preorder: bool) -> Pricing {
        let quantity = quantity.clamp(MIN_QUANTITY, MAX_QUANTITY);

        let subtotal_cents = self.unit_price_cents(is_preorder) * quantity as i64;
        let packaging_fee_cents = PACKAGING_FEE_CENTS;
        let shipping_fee_cents = self.shipping_fee(country, quantity);

        Pricing {
            subtotal_cents,
            packaging_fee_cents,
            shipping_fee_cents,
            total_cents: subtotal_cents + packaging_fee_cents + shipping_fee_cents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hk_shipping_steps() {
        let engine = PricingEngine::new();
        assert_eq!(engine.price(1, "HK", false).shipping_fee_cents, 2000);
        assert_eq!(engine.price(2, "HK", false).shipping_fee_cents, 2500);
        assert_eq!(engine.price(3, "HK", false).shipping_fee_cents, 5000);
        assert_eq!(engine.price(4, "HK", false).shipping_fee_cents, 5000);
        assert_eq!(engine.price(5, "HK", false).shipping_fee_cents, 7000);
    }

    #[test]
    fn test_unrecognized_country_uses_other_bucket() {
        let engine = PricingEngine::new();
        assert_eq!(engine.price(1, "France", true).shipping_fee_cents, 3000);
        assert_eq!(engine.price(2, "", true).shipping_fee_cents, 5000);
    }

    #[test]
    fn test_full_breakdown() {
        let pricing = PricingEngine::new().price(2, "Taiwan", true);
        assert_eq!(
            pricing,
            Pricing {
                subtotal_cents: 18400,
                packaging_fee_cents: 1000,
                shipping_fee_cents: 4000,
                total_cents: 23400,
            }
        );
    }

    #[test]
    fn test_regular_price_tier() {
        let pricing = PricingEngine::new().price(1, "HK", false);
        assert_eq!(pricing.subtotal_cents, 11500);
        assert_eq!(pricing.total_cents, 11500 + 1000 + 2000);
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(0), 1);
        assert_eq!(clamp_quantity(-7), 1);
        assert_eq!(clamp_quantity(100), 99);
        assert_eq!(clamp_quantity(42), 42);
    }

    #[test]
    fn test_pricing_wire_format() {
        let json = serde_json::to_value(PricingEngine::new().price(1, "HK", true)).unwrap();
        assert_eq!(json["subtotalCents"], 9200);
        assert_eq!(json["totalCents"], 12200);
    }

    fn country() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("HK".to_string()),
            Just("Hong Kong".to_string()),
            Just("Mainland".to_string()),
            Just("China".to_string()),
            Just("Taiwan".to_string()),
            ".{0,16}",
        ]
    }

    proptest! {
        #[test]
        fn prop_total_is_sum_of_parts(quantity in 1u32..=99, country in country(), preorder in any::<bool>()) {
            let pricing = PricingEngine::new().price(quantity, &country, preorder);
            prop_assert!(pricing.is_consistent());
            prop_assert_eq!(
                pricing.subtotal_cents,
                PricingEngine::new().unit_price_cents(preorder) * quantity as i64
            );
            prop_assert_eq!(pricing.packaging_fee_cents, PACKAGING_FEE_CENTS);
        }

        #[test]
        fn prop_pricing_is_deterministic(quantity in 1u32..=99, country in country(), preorder in any::<bool>()) {
            let a = PricingEngine::new().price(quantity, &country, preorder);
            let b = PricingEngine::default().price(quantity, &country, preorder);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_shipping_matches_breakdown(quantity in 1u32..=99, country in country()) {
            let engine = PricingEngine::new();
            prop_assert_eq!(
                engine.shipping_fee(&country, quantity),
                engine.price(quantity, &country, false).shipping_fee_cents
            );
        }

        #[test]
        fn prop_shipping_is_non_decreasing(quantity in 1u32..99, country in country()) {
            let engine = PricingEngine::new();
            prop_assert!(engine.shipping_fee(&country, quantity) <= engine.shipping_fee(&country, quantity + 1));
        }
    }
}
