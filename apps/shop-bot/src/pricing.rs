/// Flat per-month pricing in the settlement currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    unit_price: i64,
}

impl Pricing {
    pub fn new(unit_price: i64) -> Self {
        Self { unit_price }
    }

    pub fn price(&self, months: i32) -> i64 {
        self.unit_price * i64::from(months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn offered_durations() {
        let pricing = Pricing::new(150);
        assert_eq!(pricing.price(1), 150);
        assert_eq!(pricing.price(3), 450);
        assert_eq!(pricing.price(6), 900);
    }

    proptest! {
        #[test]
        fn price_is_linear(unit in 1i64..100_000, months in 1i32..1_000) {
            let pricing = Pricing::new(unit);
            prop_assert_eq!(pricing.price(months * 2), pricing.price(months) * 2);
        }
    }
}
