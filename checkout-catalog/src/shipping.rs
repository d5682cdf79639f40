use serde::{Deserialize, Serialize};

/// Country grouping used to look up a shipping fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShippingZone {
    #[serde(rename = "HK")]
    HongKong,
    Mainland,
    Taiwan,
    Other,
}

impl ShippingZone {
    /// Normalize a free-form country string. Unrecognized input, including the
    /// empty string, lands in `Other`.
    pub fn from_country(country: &str) -> Self {
        let country = country.trim();
        let is = |name: &str| country.eq_ignore_ascii_case(name);

        if is("HK") || is("Hong Kong") {
            ShippingZone::HongKong
        } else if is("Mainland") || is("China") || is("Mainland China") {
            ShippingZone::Mainland
        } else if is("Taiwan") {
            ShippingZone::Taiwan
        } else {
            ShippingZone::Other
        }
    }

    /// Fee in cents for a quantity band.
    pub fn fee_cents(self, band: QuantityBand) -> i64 {
        use QuantityBand::*;
        match (self, band) {
            (ShippingZone::HongKong, Single) => 2000,
            (ShippingZone::HongKong, Pair) => 2500,
            (ShippingZone::HongKong, Small) => 5000,
            (ShippingZone::HongKong, Bulk) => 7000,

            (ShippingZone::Mainland | ShippingZone::Taiwan, Single) => 2500,
            (ShippingZone::Mainland | ShippingZone::Taiwan, Pair) => 4000,
            (ShippingZone::Mainland | ShippingZone::Taiwan, Small) => 7000,
            (ShippingZone::Mainland | ShippingZone::Taiwan, Bulk) => 10000,

            (ShippingZone::Other, Single) => 3000,
            (ShippingZone::Other, Pair) => 5000,
            (ShippingZone::Other, Small) => 8000,
            (ShippingZone::Other, Bulk) => 12000,
        }
    }
}

/// Quantity tier within a zone: 1, 2, 3-4, 5+.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityBand {
    Single,
    Pair,
    Small,
    Bulk,
}

impl QuantityBand {
    pub fn from_quantity(quantity: u32) -> Self {
        match quantity {
            0 | 1 => QuantityBand::Single,
            2 => QuantityBand::Pair,
            3 | 4 => QuantityBand::Small,
            _ => QuantityBand::Bulk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_aliases() {
        assert_eq!(ShippingZone::from_country("HK"), ShippingZone::HongKong);
        assert_eq!(ShippingZone::from_country("Hong Kong"), ShippingZone::HongKong);
        assert_eq!(ShippingZone::from_country(" hong kong "), ShippingZone::HongKong);
        assert_eq!(ShippingZone::from_country("China"), ShippingZone::Mainland);
        assert_eq!(ShippingZone::from_country("Mainland China"), ShippingZone::Mainland);
        assert_eq!(ShippingZone::from_country("Taiwan"), ShippingZone::Taiwan);
        assert_eq!(ShippingZone::from_country("France"), ShippingZone::Other);
        assert_eq!(ShippingZone::from_country(""), ShippingZone::Other);
    }

    #[test]
    fn test_band_breakpoints() {
        assert_eq!(QuantityBand::from_quantity(1), QuantityBand::Single);
        assert_eq!(QuantityBand::from_quantity(2), QuantityBand::Pair);
        assert_eq!(QuantityBand::from_quantity(3), QuantityBand::Small);
        assert_eq!(QuantityBand::from_quantity(4), QuantityBand::Small);
        assert_eq!(QuantityBand::from_quantity(5), QuantityBand::Bulk);
        assert_eq!(QuantityBand::from_quantity(99), QuantityBand::Bulk);
    }

    #[test]
    fn test_zone_serializes_as_bucket_name() {
        assert_eq!(serde_json::to_string(&ShippingZone::HongKong).unwrap(), "\"HK\"");
        assert_eq!(serde_json::to_string(&ShippingZone::Other).unwrap(), "\"Other\"");
    }
}
