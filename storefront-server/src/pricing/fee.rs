//! Service fee charged on top of the order total

use super::{percent_of, round_money};
use rust_decimal::Decimal;

/// `fee(total) = total × percent / 100 + fixed`, rounded to cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceFee {
    pub percent: Decimal,
    pub fixed: Decimal,
}

impl ServiceFee {
    pub fn new(percent: Decimal, fixed: Decimal) -> Self {
        Self { percent, fixed }
    }

    pub fn fee(&self, total: Decimal) -> Decimal {
        let fee = percent_of(total, self.percent) + self.fixed;
        round_money(fee.max(Decimal::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee() {
        let fee = ServiceFee::new(Decimal::new(25, 1), Decimal::new(30, 2));
        // 2.5% of 40.00 = 1.00, plus 0.30
        assert_eq!(fee.fee(Decimal::new(4000, 2)), Decimal::new(130, 2));
        assert_eq!(ServiceFee::default().fee(Decimal::from(99)), Decimal::ZERO);
    }
}
