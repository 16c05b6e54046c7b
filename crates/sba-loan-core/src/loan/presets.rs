use serde::{Deserialize, Serialize};

use super::field::LoanField;
use super::validation::RawLoanRequest;

/// Whether the borrower is buying a business. Drives the form defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPurpose {
    /// Business acquisition ("buyout"): 2.5% SBA fee.
    Buyout,
    /// Any other use of funds: 3% SBA fee.
    #[default]
    General,
}

impl LoanPurpose {
    pub fn default_value(self, field: LoanField) -> &'static str {
        match field {
            LoanField::AmountSeeking => "$100,000",
            LoanField::TermLength => "10",
            LoanField::DownPayment => "15",
            LoanField::SbaFees => match self {
                LoanPurpose::Buyout => "2.5",
                LoanPurpose::General => "3",
            },
            LoanField::AnnualRate => "6.75",
        }
    }

    /// A request populated entirely with this purpose's defaults.
    pub fn defaults(self) -> RawLoanRequest {
        let mut raw = RawLoanRequest::default();
        self.fill_missing(&mut raw);
        raw
    }

    /// Fill only the fields the caller left out. Supplied values are kept
    /// as-is and still go through validation.
    pub fn fill_missing(self, raw: &mut RawLoanRequest) {
        for field in LoanField::ALL {
            if raw.get(field).is_none() {
                raw.set(field, self.default_value(field));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::validation::validate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_are_valid() {
        for purpose in [LoanPurpose::Buyout, LoanPurpose::General] {
            let req = validate(&purpose.defaults()).unwrap();
            assert_eq!(req.amount_seeking, dec!(100000));
            assert_eq!(req.down_payment_percent, dec!(15));
        }
    }

    #[test]
    fn test_fee_depends_on_purpose() {
        assert_eq!(LoanPurpose::Buyout.defaults().sba_fees.as_deref(), Some("2.5"));
        assert_eq!(LoanPurpose::General.defaults().sba_fees.as_deref(), Some("3"));
    }

    #[test]
    fn test_fill_keeps_supplied_values() {
        let mut raw = RawLoanRequest {
            amount_seeking: Some("abc".into()),
            ..Default::default()
        };
        LoanPurpose::Buyout.fill_missing(&mut raw);
        assert_eq!(raw.amount_seeking.as_deref(), Some("abc"));
        assert_eq!(raw.term_length.as_deref(), Some("10"));
        assert!(validate(&raw).is_err());
    }
}
