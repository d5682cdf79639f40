pub mod pricing;
pub mod shipping;

pub use pricing::{clamp_quantity, Pricing, PricingEngine, MAX_QUANTITY, MIN_QUANTITY};
pub use shipping::{QuantityBand, ShippingZone};
