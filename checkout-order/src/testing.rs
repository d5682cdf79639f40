use checkout_catalog::PricingEngine;
use checkout_shared::Masked;

use crate::cart::Cart;
use crate::models::{Customer, Order};

pub fn sample_cart(quantity: i64) -> Cart {
    Cart {
        full_name: "Chan Tai Man".to_string(),
        address: Masked::from("1 Nathan Road"),
        city: "Kowloon".to_string(),
        country: "HK".to_string(),
        email: Masked::from("taiman@example.com"),
        quantity: Some(quantity),
        is_preorder: true,
    }
}

pub fn sample_order(payment_reference: &str) -> Order {
    let customer = Customer {
        full_name: "Chan Tai Man".to_string(),
        address: Masked::from("1 Nathan Road"),
        city: "Kowloon".to_string(),
        country: "HK".to_string(),
        email: Masked::from("taiman@example.com"),
    };
    let mut order = Order::new(customer, 2, true, PricingEngine::new().price(2, "HK", true), "hkd");
    order.payment_reference = Some(payment_reference.to_string());
    order
}
