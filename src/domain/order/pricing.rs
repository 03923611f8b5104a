use super::value_objects::Pilotes;

/// Maps a pilotes count to the order total, in cents.
///
/// Restricting quantities to the sold sizes is done when commands are
/// validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    unit_price_in_cents: i64,
}

impl PricingPolicy {
    /// Largest unit price for which every sold size has a representable total.
    pub const MAX_UNIT_PRICE_IN_CENTS: i64 = i64::MAX / Pilotes::LARGEST as i64;

    pub fn new(unit_price_in_cents: i64) -> Self {
        Self { unit_price_in_cents }
    }

    pub fn unit_price_in_cents(&self) -> i64 {
        self.unit_price_in_cents
    }

    /// Exact for `|quantity| <= Pilotes::LARGEST` while the unit price is at
    /// most `MAX_UNIT_PRICE_IN_CENTS`, which `OrderConfig` enforces. Outside
    /// that range the total saturates instead of wrapping.
    pub fn total_for(&self, quantity: i32) -> i64 {
        i64::from(quantity).saturating_mul(self.unit_price_in_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_quantity_times_unit_price() {
        let pricing = PricingPolicy::new(250);

        for quantity in Pilotes::ALLOWED {
            assert_eq!(pricing.total_for(quantity), i64::from(quantity) * 250);
        }
        assert_eq!(pricing.total_for(5), 1250);
    }

    #[test]
    fn test_total_for_arbitrary_quantity() {
        let pricing = PricingPolicy::new(133);
        assert_eq!(pricing.total_for(7), 931);
        assert_eq!(pricing.unit_price_in_cents(), 133);
    }

    #[test]
    fn test_largest_size_at_max_unit_price_does_not_overflow() {
        let pricing = PricingPolicy::new(PricingPolicy::MAX_UNIT_PRICE_IN_CENTS);
        let total = pricing.total_for(Pilotes::LARGEST);

        assert_eq!(total, PricingPolicy::MAX_UNIT_PRICE_IN_CENTS * 15);
        assert_eq!(PricingPolicy::new(i64::MAX).total_for(5), i64::MAX);
    }
}
