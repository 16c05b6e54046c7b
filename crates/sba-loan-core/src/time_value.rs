use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::LoanError;
use crate::types::{Money, Rate};
use crate::SbaLoanResult;

/// Compute base^n for a non-negative integer exponent via iterative multiplication.
pub fn pow_int(base: Decimal, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result *= base;
    }
    result
}

/// Level payment that fully amortises `principal` over `nper` periods.
///
/// `payment = P * r / (1 - (1 + r)^-n)`; a zero rate falls back to straight
/// division of the principal over the periods.
pub fn monthly_payment(principal: Money, rate: Rate, nper: u32) -> SbaLoanResult<Money> {
    if nper == 0 {
        return Err(LoanError::InvalidInput {
            field: "number_of_payments".into(),
            reason: "Number of payments must be > 0".into(),
        });
    }
    if rate <= dec!(-1) {
        return Err(LoanError::InvalidInput {
            field: "monthly_rate".into(),
            reason: "Periodic rate must be greater than -100%".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let growth = pow_int(Decimal::ONE + rate, nper);
    if growth.is_zero() {
        return Err(LoanError::DivisionByZero {
            context: "payment discount factor".into(),
        });
    }

    let denominator = Decimal::ONE - Decimal::ONE / growth;
    if denominator.is_zero() {
        return Err(LoanError::DivisionByZero {
            context: "payment annuity factor".into(),
        });
    }

    Ok(principal * rate / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pow_int() {
        assert_eq!(pow_int(dec!(1.1), 0), Decimal::ONE);
        assert_eq!(pow_int(dec!(1.1), 2), dec!(1.21));
        assert_eq!(pow_int(dec!(2), 10), dec!(1024));
    }

    #[test]
    fn test_payment_matches_closed_form() {
        // 100,000 at 6%/12 over 360 months => 599.55
        let pmt = monthly_payment(dec!(100000), dec!(0.005), 360).unwrap();
        assert!((pmt - dec!(599.55)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_payment_single_period() {
        // One period: principal plus one period of interest
        let pmt = monthly_payment(dec!(1000), dec!(0.01), 1).unwrap();
        assert!((pmt - dec!(1010)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_payment_zero_rate() {
        let pmt = monthly_payment(dec!(12000), Decimal::ZERO, 120).unwrap();
        assert_eq!(pmt, dec!(100));
    }

    #[test]
    fn test_payment_zero_periods_error() {
        assert!(monthly_payment(dec!(1000), dec!(0.005), 0).is_err());
    }
}
