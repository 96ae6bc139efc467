// Utility functions shared by the wire layer
// Prices are kept at full precision in the simulator and only rounded here.

pub mod rounding {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::{Decimal, RoundingStrategy};

    /// Decimal places used on the wire
    pub const PRICE_DP: u32 = 2;

    /// Round a price to 2 decimal places, halves away from zero
    pub fn round_price(price: f64) -> Decimal {
        let mut rounded = Decimal::from_f64_retain(price)
            .unwrap_or_default()
            .round_dp_with_strategy(PRICE_DP, RoundingStrategy::MidpointAwayFromZero);
        // Fixed scale so whole numbers still print as "100.00"
        rounded.rescale(PRICE_DP);
        rounded
    }

    /// Price as sent in the `prices` map
    pub fn format_price(price: f64) -> String {
        round_price(price).to_string()
    }

    /// Price as sent in the `histories` arrays
    pub fn round_to_f64(price: f64) -> f64 {
        round_price(price).to_f64().unwrap_or_default()
    }

}
