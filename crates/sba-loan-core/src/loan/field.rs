use serde::{Deserialize, Serialize};

/// The five form fields of a loan estimate request, in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoanField {
    AmountSeeking,
    TermLength,
    DownPayment,
    SbaFees,
    AnnualRate,
}

struct FieldSpec {
    field: LoanField,
    label: &'static str,
    key: &'static str,
    error_key: &'static str,
}

static FIELDS: [FieldSpec; 5] = [
    FieldSpec {
        field: LoanField::AmountSeeking,
        label: "Amount Seeking",
        key: "amountSeeking",
        error_key: "amountSeekingError",
    },
    FieldSpec {
        field: LoanField::TermLength,
        label: "Term Length",
        key: "termLength",
        error_key: "termLengthError",
    },
    FieldSpec {
        field: LoanField::DownPayment,
        label: "Down Payment",
        key: "downPayment",
        error_key: "downPaymentError",
    },
    FieldSpec {
        field: LoanField::SbaFees,
        label: "SBA Fees",
        key: "sbaFees",
        error_key: "sbaFeesError",
    },
    FieldSpec {
        field: LoanField::AnnualRate,
        label: "Annual Rate",
        key: "annualRate",
        error_key: "annualRateError",
    },
];

impl LoanField {
    pub const ALL: [LoanField; 5] = [
        LoanField::AmountSeeking,
        LoanField::TermLength,
        LoanField::DownPayment,
        LoanField::SbaFees,
        LoanField::AnnualRate,
    ];

    fn spec(self) -> &'static FieldSpec {
        &FIELDS[self as usize]
    }

    /// Human-readable label, e.g. "Amount Seeking".
    pub fn label(self) -> &'static str {
        self.spec().label
    }

    /// Request key as submitted by the form, e.g. "amountSeeking".
    pub fn key(self) -> &'static str {
        self.spec().key
    }

    /// Key under which this field's message appears in an error response.
    pub fn error_key(self) -> &'static str {
        self.spec().error_key
    }

    /// Look a field up by its request key.
    pub fn from_key(key: &str) -> Option<LoanField> {
        FIELDS.iter().find(|spec| spec.key == key).map(|spec| spec.field)
    }
}

impl std::fmt::Display for LoanField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_discriminant() {
        for field in LoanField::ALL {
            assert_eq!(field.spec().field, field);
        }
    }

    #[test]
    fn test_keys() {
        assert_eq!(LoanField::AmountSeeking.error_key(), "amountSeekingError");
        assert_eq!(LoanField::SbaFees.key(), "sbaFees");
        assert_eq!(LoanField::TermLength.label(), "Term Length");
    }

    #[test]
    fn test_from_key() {
        assert_eq!(LoanField::from_key("downPayment"), Some(LoanField::DownPayment));
        assert_eq!(LoanField::from_key("annualRateError"), None);
        for field in LoanField::ALL {
            assert_eq!(LoanField::from_key(field.key()), Some(field));
        }
    }

    #[test]
    fn test_serde_uses_request_key() {
        for field in LoanField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.key()));
        }
    }
}
